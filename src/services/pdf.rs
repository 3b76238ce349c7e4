//! HTML to PDF rendering through an external command.
//!
//! The command reads HTML on stdin and writes the PDF to stdout
//! (`wkhtmltopdf - -` by default).

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Runs the configured HTML to PDF command.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    programa: String,
    argumentos: Vec<String>,
}

impl PdfRenderer {
    /// Split a command line on whitespace into program and arguments.
    pub fn new(comando: &str) -> AppResult<Self> {
        let mut partes = comando.split_whitespace().map(str::to_string);
        let programa = partes
            .next()
            .ok_or_else(|| AppError::Render("PDF command is empty".to_string()))?;

        Ok(Self {
            programa,
            argumentos: partes.collect(),
        })
    }

    /// Render `html` and return the PDF bytes.
    pub async fn render(&self, html: &str) -> AppResult<Vec<u8>> {
        let mut child = Command::new(&self.programa)
            .args(&self.argumentos)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::Render(format!("Failed to start '{}': {}", self.programa, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::Render("PDF command stdin unavailable".to_string()))?;
        let entrada = html.as_bytes().to_vec();
        let escritor = tokio::spawn(async move {
            stdin.write_all(&entrada).await?;
            stdin.shutdown().await
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AppError::Render(format!("PDF command failed: {}", e)))?;

        match escritor.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(AppError::Render(format!("Failed to write HTML: {}", e))),
            Err(e) => return Err(AppError::Render(format!("HTML writer task failed: {}", e))),
        }

        if !output.status.success() {
            return Err(AppError::Render(format!(
                "'{}' exited with {}: {}",
                self.programa,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(AppError::Render(format!(
                "'{}' produced no output",
                self.programa
            )));
        }

        debug!(bytes = output.stdout.len(), "PDF rendered");
        Ok(output.stdout)
    }
}
