//! `parse-asset` command: split a release asset URL into its parts.

use krew_release::source::AssetReference;

use crate::error::CliError;

/// Run the parse-asset command.
pub fn run(uri: &str) -> Result<(), CliError> {
    let reference = AssetReference::parse(uri)?;
    print!("{}", describe(&reference));
    Ok(())
}

fn describe(reference: &AssetReference) -> String {
    format!(
        "owner: {}\nrepo:  {}\ntag:   {}\nasset: {}\n",
        reference.owner, reference.repo, reference.tag, reference.asset
    )
}
