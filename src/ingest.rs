use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::build::build;
use crate::error::{IngestError, Result};
use crate::extract::{Rows, extract};
use crate::io::excel_read;
use crate::model::{
    DateRange, OperationRecord, SourceRef, SummaryResult, TemplateId, ValidationIssue, Worksheet,
};
use crate::normalize::normalize_row;
use crate::summary::summarize;
use crate::template::{
    DetectorConfig, HeaderMatch, TemplateCatalog, TemplateChoice, TemplateDescriptor,
    TemplateDetector,
};

/// Outcome of one data row: a record, or the issue that prevented it.
pub type RowOutcome = std::result::Result<OperationRecord, ValidationIssue>;

/// Runs worksheets through detection, extraction, normalization and
/// record building against one shared catalog.
#[derive(Debug, Clone, Copy)]
pub struct Ingestor<'c> {
    catalog: &'c TemplateCatalog,
    config: DetectorConfig,
}

impl<'c> Ingestor<'c> {
    pub fn new(catalog: &'c TemplateCatalog, config: DetectorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn detector(&self) -> TemplateDetector<'c> {
        TemplateDetector::new(self.catalog, self.config)
    }

    /// Resolves the template and column layout of `sheet` and returns the
    /// lazy per-row outcomes. Resolution and layout failures are fatal and
    /// surface here, before any row is read.
    pub fn operations<'a>(
        &self,
        sheet: &'a Worksheet,
        choice: TemplateChoice,
        source: SourceRef,
    ) -> Result<Operations<'a>>
    where
        'c: 'a,
    {
        let header = self.detector().locate(sheet, choice)?;
        let descriptor = self.catalog.descriptor_for(header.template)?;
        let rows = extract(sheet, descriptor, header.row)?;
        Ok(Operations {
            header,
            rows,
            descriptor,
            source,
        })
    }

    /// Processes a whole worksheet and collects its records and issues.
    #[instrument(level = "info", skip_all, fields(sheet = %sheet.name, source = %source))]
    pub fn ingest_sheet(
        &self,
        sheet: &Worksheet,
        choice: TemplateChoice,
        source: SourceRef,
    ) -> Result<IngestOutcome> {
        let operations = match self.operations(sheet, choice, source) {
            Ok(operations) => operations,
            Err(error) => {
                warn!(%error, "worksheet rejected");
                return Err(error);
            }
        };
        debug!(
            template = %operations.template(),
            header_row = operations.header().row + 1,
            columns = ?operations.rows.columns().bindings(),
            "template resolved"
        );

        let outcome = IngestOutcome::collect(operations);
        for issue in &outcome.issues {
            debug!(%issue, "row rejected");
        }
        info!(
            template = %outcome.template,
            records = outcome.records.len(),
            issues = outcome.issues.len(),
            "worksheet processed"
        );
        Ok(outcome)
    }

    /// Reads a spreadsheet file and processes its worksheet.
    #[instrument(level = "info", skip_all, fields(input = %path.display()))]
    pub fn ingest_file(
        &self,
        path: &Path,
        choice: TemplateChoice,
        sheet: Option<&str>,
    ) -> Result<IngestOutcome> {
        if !path.exists() {
            return Err(IngestError::MissingInput(path.to_path_buf()));
        }
        let worksheet = excel_read::read_worksheet(path, sheet)?;
        debug!(rows = worksheet.len(), sheet = %worksheet.name, "worksheet decoded");
        self.ingest_sheet(&worksheet, choice, SourceRef::new(path.display().to_string()))
    }
}

/// Lazy, single-pass sequence of row outcomes of one worksheet.
#[derive(Debug)]
pub struct Operations<'a> {
    header: HeaderMatch,
    rows: Rows<'a>,
    descriptor: &'a TemplateDescriptor,
    source: SourceRef,
}

impl Operations<'_> {
    pub fn template(&self) -> TemplateId {
        self.descriptor.id
    }

    pub fn header(&self) -> HeaderMatch {
        self.header
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }
}

impl Iterator for Operations<'_> {
    type Item = RowOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        let mut raw = self.rows.next()?;
        self.descriptor.derivation.apply(&mut raw);
        let outcome = normalize_row(&raw, self.descriptor.signed_amounts).and_then(|mut row| {
            self.descriptor.settle(&mut row);
            build(row, self.descriptor.id, &self.source)
        });
        Some(outcome)
    }
}

/// Records and issues of one processed worksheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestOutcome {
    pub source: SourceRef,
    pub template: TemplateId,
    pub records: Vec<OperationRecord>,
    pub issues: Vec<ValidationIssue>,
}

impl IngestOutcome {
    /// Drains `operations`, splitting successes from issues. Row order is
    /// kept within each list.
    pub fn collect(operations: Operations<'_>) -> Self {
        let source = operations.source().clone();
        let template = operations.template();
        let (mut records, mut issues) = (Vec::new(), Vec::new());
        for outcome in operations {
            match outcome {
                Ok(record) => records.push(record),
                Err(issue) => issues.push(issue),
            }
        }
        Self {
            source,
            template,
            records,
            issues,
        }
    }

    /// Number of rows that produced a record and number that did not.
    pub fn counts(&self) -> BatchCounts {
        BatchCounts {
            records: self.records.len(),
            issues: self.issues.len(),
        }
    }

    pub fn summary(&self, range: Option<DateRange>) -> SummaryResult {
        summarize(&self.records, range)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub records: usize,
    pub issues: usize,
}
