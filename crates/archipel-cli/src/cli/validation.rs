/// A toolchain command line split into program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainCommand(pub Vec<String>);

/// Parse a toolchain command line.
///
/// The value is split on whitespace; quoting is not supported, use the
/// `toolchain` array in the configuration file for arguments with spaces.
///
/// # Examples
///
/// Valid: `archipel-toolchain`, `node toolchain/archipel-toolchain.mjs`
/// Invalid: `""`, `"   "`
pub fn parse_toolchain(s: &str) -> Result<ToolchainCommand, String> {
    let parts: Vec<String> = s.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        return Err("Toolchain command cannot be empty".to_string());
    }
    Ok(ToolchainCommand(parts))
}
