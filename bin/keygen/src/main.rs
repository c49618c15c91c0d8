use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

/// Prints a fresh Ed25519 keypair in the format the service consumes:
/// TOKEN_PRIVATE_KEY is the hex of the 64-byte seed-plus-public form.
fn main() {
    let signing = SigningKey::generate(&mut OsRng);

    println!(
        "TOKEN_PRIVATE_KEY={}",
        hex::encode(signing.to_keypair_bytes())
    );
    println!("public_key={}", hex::encode(signing.verifying_key().as_bytes()));
}
