//! # CLI Interface
//!
//! Defines the command-line argument structure for `xs-tool` using `clap`
//! derive. Key material is taken from flags or the `XS_*` environment
//! variables so it does not have to appear in shell history.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Express Statement integration tool.
///
/// Builds canonical forms, signs and verifies payloads, and runs the
/// response marshaller against captured bodies.
#[derive(Parser, Debug)]
#[command(
    name = "xs-tool",
    about = "Express Statement signing and marshalling tool",
    version,
    propagate_version = true
)]
pub struct XsToolCli {
    /// Log output format on stderr.
    #[arg(long, global = true, env = "XS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the GET signing string for `key=value` pairs.
    Canonicalize(CanonicalizeArgs),
    /// Sign data with the application private key.
    Sign(SignArgs),
    /// Verify a base64 signature; exits non-zero on mismatch.
    Verify(VerifyArgs),
    /// Print a fresh anti-replay nonce.
    Nonce,
    /// Validate a public key and print its fingerprint.
    InspectKey(InspectKeyArgs),
    /// Run the marshaller on a JSON body and print the normalized result.
    Parse(ParseArgs),
}

#[derive(Parser, Debug)]
pub struct CanonicalizeArgs {
    /// Query parameters as `key=value`. Order does not matter.
    #[arg(required = true)]
    pub params: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct SignArgs {
    /// Base64 raw 32-byte P-256 private key.
    #[arg(long, env = "XS_APP_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    #[command(flatten)]
    pub input: DataInput,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Base64 uncompressed 65-byte P-256 public key.
    #[arg(long, env = "XS_SERVER_PUBLIC_KEY")]
    pub public_key: String,

    /// Base64 DER signature, as found in the `X-Data-Signature` header.
    #[arg(long)]
    pub signature: String,

    #[command(flatten)]
    pub input: DataInput,
}

/// Signed bytes, given inline or read from a file.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct DataInput {
    /// Data as text (a canonical query string or a JSON body).
    #[arg(long)]
    pub data: Option<String>,

    /// Read the data from a file, byte for byte.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct InspectKeyArgs {
    /// Base64 uncompressed 65-byte P-256 public key.
    #[arg(long, env = "XS_SERVER_PUBLIC_KEY")]
    pub public_key: String,
}

#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Response type the body should be decoded as.
    #[arg(long, value_enum)]
    pub kind: BodyKind,

    /// File holding the JSON body.
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Statement,
    LinkedAccounts,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        XsToolCli::command().debug_assert();
    }

    #[test]
    fn parses_verify_with_inline_data() {
        let cli = XsToolCli::try_parse_from([
            "xs-tool",
            "verify",
            "--public-key",
            "BAAA",
            "--signature",
            "MAA=",
            "--data",
            "a=1",
        ])
        .unwrap();
        match cli.command {
            Commands::Verify(args) => {
                assert_eq!(args.input.data.as_deref(), Some("a=1"));
                assert!(args.input.file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn data_and_file_are_exclusive() {
        let result = XsToolCli::try_parse_from([
            "xs-tool",
            "sign",
            "--private-key",
            "AAAA",
            "--data",
            "x",
            "--file",
            "body.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_kind_is_kebab_case() {
        let cli = XsToolCli::try_parse_from([
            "xs-tool",
            "parse",
            "--kind",
            "linked-accounts",
            "--file",
            "body.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Parse(args) => assert_eq!(args.kind, BodyKind::LinkedAccounts),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
