use anyhow::Result;
use canaicode::cli::ExtractCli;

fn main() -> Result<()> {
    let cli = ExtractCli::parse();
    cli.execute()
}
