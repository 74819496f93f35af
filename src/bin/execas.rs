use anyhow::Result;

fn main() -> Result<()> {
    execas::cli::run()
}
