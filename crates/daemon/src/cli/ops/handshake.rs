use clap::Args;

use commsec_daemon::handshake::{HandshakeClient, HandshakeError, HandshakeOutcome};

/// Run one full key-agreement handshake against the remote daemon.
///
/// Secret material is never printed; the output reports sizes and the final
/// constant-time comparison outcome only.
#[derive(Args, Debug, Clone)]
pub struct Handshake;

#[derive(Debug, thiserror::Error)]
pub enum HandshakeOpError {
    #[error("daemon has no active key generation yet, is it still starting?")]
    ServiceUnavailable,
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Handshake {
    type Error = HandshakeOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = HandshakeClient::new(&ctx.remote)?;
        let report = client.run().await.map_err(|e| match e {
            HandshakeError::Transport(t) if t.is_service_unavailable() => {
                HandshakeOpError::ServiceUnavailable
            }
            other => HandshakeOpError::Handshake(other),
        })?;

        let mut lines = Vec::new();
        lines.push(format!("Remote: {}", ctx.remote));
        lines.push(format!(
            "Public key:    {} base64 chars (1568 bytes)",
            report.public_key_b64_len
        ));
        lines.push(format!("Ciphertext:    {} bytes", report.ciphertext_len));
        lines.push(format!(
            "Server secret: {} base64 chars",
            report.server_secret_b64_len
        ));
        lines.push(String::new());
        match report.outcome {
            HandshakeOutcome::Matched => {
                lines.push("Handshake complete - shared secret matches".to_string());
            }
            HandshakeOutcome::Mismatched => {
                lines.push("Handshake MISMATCH - secrets differ".to_string());
            }
        }

        Ok(lines.join("\n"))
    }
}
