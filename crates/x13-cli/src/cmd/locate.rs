//! Locate command

use anyhow::Result;

/// Print the path of the installed executable
pub fn locate() -> Result<()> {
    let path = x13_core::find_x13_bin()?;
    println!("{}", path.display());
    Ok(())
}
