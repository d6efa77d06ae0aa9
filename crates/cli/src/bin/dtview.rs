use anyhow::Result;

fn main() -> Result<()> {
    dtview_cli::main_entry()
}
