use crate::domain::purchase::PurchaseResult;
use crate::error::Result;
use crate::infrastructure::fragment::RecipientProfile;
use crate::infrastructure::in_memory::Submission;
use std::io::Write;

/// Renders purchase outcomes for humans.
///
/// Writes plain `key: value` lines so the output stays greppable.
pub struct ReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_result(&mut self, result: &PurchaseResult) -> Result<()> {
        if result.success {
            writeln!(self.writer, "status: success")?;
            writeln!(self.writer, "transaction_id: {}", result.transaction_id)?;
            for link in result.explorer_links() {
                writeln!(self.writer, "explorer: {}", link)?;
            }
        } else {
            writeln!(self.writer, "status: failed")?;
            if let Some(kind) = result.failure {
                let label = serde_json::to_value(kind)?;
                writeln!(self.writer, "failure: {}", label.as_str().unwrap_or_default())?;
            }
            if let Some(diagnostic) = &result.diagnostic {
                writeln!(self.writer, "detail: {}", diagnostic)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Reports a dry run: the transfer that would have been broadcast, or the
    /// failure that stopped the attempt before a transfer was prepared.
    pub fn write_dry_run(
        &mut self,
        result: &PurchaseResult,
        transfer: Option<&Submission>,
    ) -> Result<()> {
        match transfer {
            Some(transfer) if result.success => {
                writeln!(self.writer, "status: dry-run")?;
                writeln!(self.writer, "destination: {}", transfer.destination_address)?;
                writeln!(self.writer, "amount: {}", transfer.amount_display_units)?;
                writeln!(self.writer, "comment: {}", transfer.comment)?;
                self.writer.flush()?;
                Ok(())
            }
            _ => self.write_result(result),
        }
    }

    pub fn write_profile(&mut self, profile: Option<&RecipientProfile>) -> Result<()> {
        match profile {
            Some(profile) => {
                serde_json::to_writer_pretty(&mut self.writer, profile)?;
                writeln!(self.writer)?;
            }
            None => writeln!(self.writer, "recipient not found")?,
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
