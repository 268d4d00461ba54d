use base64::Engine as _;
use color_eyre::eyre::{eyre, Result};
use ring::rand::{SecureRandom as _, SystemRandom};

/// Private cookies need at least 64 bytes of key material
const KEY_LEN: usize = 64;

fn main() -> Result<()> {
    color_eyre::install()?;

    let mut key = [0u8; KEY_LEN];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| eyre!("Failed to gather randomness for the cookie key"))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(key);

    println!("Generated cookie key:");
    println!("{}", encoded);
    println!();
    println!("Use this as your COOKIE_KEY environment variable, for example in .env:");
    println!("COOKIE_KEY=\"{}\"", encoded);

    Ok(())
}
