use std::path::Path;

use nodefit_core::NodefitConfig;

use super::CONFIG_FILE;

pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    let output = path.join(CONFIG_FILE);
    if output.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
    }

    NodefitConfig::scaffold().write_to(&output)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}
