//! Generates the `Db` configuration companions.

fn main() -> Result<(), confkey_gen::BuildError> {
    confkey_gen::Builder::from_env()?
        .source("src/keys.rs", "crate::keys")
        .generate()?;
    Ok(())
}
