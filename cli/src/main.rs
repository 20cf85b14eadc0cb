// Copyright (c) 2026 Express Statement contributors. Apache-2.0 License.
// See LICENSE for details.

//! # xs-tool
//!
//! Entry point for the `xs-tool` binary. Parses CLI arguments, initializes
//! logging, and runs one of the core operations of the client library:
//!
//! - `canonicalize` — print the GET signing string
//! - `sign`         — sign data with the application key
//! - `verify`       — check a signature against a public key
//! - `nonce`        — print a fresh anti-replay nonce
//! - `inspect-key`  — validate a public key and print its fingerprint
//! - `parse`        — decode a captured response body

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clap::Parser;

use express_statement::canonical::encode_query_for_signing;
use express_statement::marshal::{self, Marshal};
use express_statement::model::{ErrorResponse, GetLinkedAccountListResponse, GetStatementResponse};
use express_statement::{KeyCodec, SignatureDer, SignatureEngine};

use cli::{BodyKind, Commands, DataInput, XsToolCli};

fn main() -> Result<()> {
    let cli = XsToolCli::parse();
    logging::init_logging("xs_tool=info,express_statement=info", cli.log_format);

    match cli.command {
        Commands::Canonicalize(args) => canonicalize(&args.params),
        Commands::Sign(args) => sign(&args.private_key, &args.input),
        Commands::Verify(args) => verify(&args.public_key, &args.signature, &args.input),
        Commands::Nonce => {
            println!("{}", SignatureEngine::default().nonce()?);
            Ok(())
        }
        Commands::InspectKey(args) => inspect_key(&args.public_key),
        Commands::Parse(args) => parse(args.kind, &args.file),
    }
}

/// Splits `key=value` arguments. A missing `=` means an empty value.
fn split_params(params: &[String]) -> Vec<(&str, &str)> {
    params
        .iter()
        .map(|param| param.split_once('=').unwrap_or((param.as_str(), "")))
        .collect()
}

fn canonicalize(params: &[String]) -> Result<()> {
    let canonical = encode_query_for_signing(split_params(params))?;
    println!("{}", canonical);
    Ok(())
}

fn read_input(input: &DataInput) -> Result<Vec<u8>> {
    match (&input.data, &input.file) {
        (Some(data), _) => Ok(data.clone().into_bytes()),
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        (None, None) => bail!("either --data or --file is required"),
    }
}

fn decode_base64(label: &str, value: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(value.trim())
        .with_context(|| format!("{} is not valid base64", label))
}

fn sign(private_key: &str, input: &DataInput) -> Result<()> {
    let codec = KeyCodec::default();
    let key = codec
        .decode_private_key(&decode_base64("private key", private_key)?)
        .context("invalid private key")?;
    let data = read_input(input)?;

    let signature = SignatureEngine::new(codec.curve()).sign(&data, &key)?;
    tracing::info!(
        bytes = data.len(),
        key = %key.public_key().fingerprint(),
        "data signed"
    );
    println!("{}", signature.to_base64());
    Ok(())
}

fn verify(public_key: &str, signature: &str, input: &DataInput) -> Result<()> {
    let codec = KeyCodec::default();
    let key = codec
        .decode_public_key(&decode_base64("public key", public_key)?)
        .context("invalid public key")?;
    let signature = SignatureDer::from_base64(signature).context("signature is not valid base64")?;
    let data = read_input(input)?;

    SignatureEngine::new(codec.curve())
        .verify_detailed(&data, signature.as_bytes(), &key)
        .with_context(|| format!("signature does not match key {}", key.fingerprint()))?;

    println!("valid");
    Ok(())
}

fn inspect_key(public_key: &str) -> Result<()> {
    let codec = KeyCodec::default();
    let key = codec
        .decode_public_key(&decode_base64("public key", public_key)?)
        .context("invalid public key")?;

    println!("curve       : {}", codec.curve().name());
    println!("algorithm   : {}", codec.curve().signing_algorithm());
    println!("fingerprint : {}", key.fingerprint());
    println!("x           : {}", hex::encode(key.x()));
    println!("y           : {}", hex::encode(key.y()));
    Ok(())
}

fn parse(kind: BodyKind, path: &std::path::Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let normalized = match kind {
        BodyKind::Statement => normalize::<GetStatementResponse>(&bytes)?,
        BodyKind::LinkedAccounts => normalize::<GetLinkedAccountListResponse>(&bytes)?,
        BodyKind::Error => normalize::<ErrorResponse>(&bytes)?,
    };
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

fn normalize<T: Marshal>(bytes: &[u8]) -> Result<serde_json::Value> {
    let dto: T = marshal::from_slice(bytes)
        .with_context(|| format!("body does not decode as {}", T::descriptor().name))?;
    Ok(marshal::to_value(&dto)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_split_on_first_equals() {
        let params = vec!["a=1=2".to_string(), "flag".to_string()];
        assert_eq!(split_params(&params), vec![("a", "1=2"), ("flag", "")]);
    }

    #[test]
    fn normalize_fills_declared_fields() {
        let value = normalize::<ErrorResponse>(br#"{"ERRORS":[{"code":"ERROR_X"}]}"#).unwrap();
        assert_eq!(value["errors"][0]["code"], "ERROR_X");
        assert_eq!(value["errors"][0]["description"], "");
    }
}
