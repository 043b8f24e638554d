use crate::error::{ConfigurationMismatch, ResolutionError, Result};
use crate::model::{TemplateId, Worksheet};
use crate::template::{TemplateCatalog, TemplateDescriptor};

/// Tunables of template detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Fraction of a template's expected labels a header row must carry.
    pub min_overlap: f64,
    /// Scores closer than this to the best one count as a tie.
    pub epsilon: f64,
    /// How many leading rows may precede the header row.
    pub header_scan_rows: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_overlap: 0.5,
            epsilon: 0.1,
            header_scan_rows: 20,
        }
    }
}

/// How the template of a sheet is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateChoice {
    Detect,
    Explicit(TemplateId),
}

/// The header row of a sheet and the template it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatch {
    pub template: TemplateId,
    /// Zero-based index of the header row.
    pub row: usize,
}

/// Scores header rows against the labels of every catalog descriptor.
#[derive(Debug, Clone, Copy)]
pub struct TemplateDetector<'c> {
    catalog: &'c TemplateCatalog,
    config: DetectorConfig,
}

impl<'c> TemplateDetector<'c> {
    pub fn new(catalog: &'c TemplateCatalog, config: DetectorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Overlap score of every descriptor, in catalog order.
    pub fn scores<S: AsRef<str>>(&self, header: &[S]) -> Vec<(TemplateId, f64)> {
        let tokens = header_tokens(header);
        self.catalog
            .descriptors()
            .iter()
            .map(|descriptor| (descriptor.id, overlap(descriptor, &tokens)))
            .collect()
    }

    /// Identifies the template a header row belongs to.
    ///
    /// Near-ties between templates fail with [`ResolutionError::Ambiguous`];
    /// a wrong pick would corrupt every row extracted afterwards.
    pub fn detect<S: AsRef<str>>(
        &self,
        header: &[S],
    ) -> std::result::Result<TemplateId, ResolutionError> {
        let mut passing: Vec<(TemplateId, f64)> = self
            .scores(header)
            .into_iter()
            .filter(|(_, score)| *score > 0.0 && *score >= self.config.min_overlap)
            .collect();
        passing.sort_by(|lhs, rhs| rhs.1.total_cmp(&lhs.1));

        let Some(&(best, best_score)) = passing.first() else {
            return Err(ResolutionError::NoMatch);
        };

        let candidates: Vec<TemplateId> = passing
            .iter()
            .filter(|(_, score)| best_score - score <= self.config.epsilon)
            .map(|(id, _)| *id)
            .collect();

        if candidates.len() > 1 {
            Err(ResolutionError::Ambiguous { candidates })
        } else {
            Ok(best)
        }
    }

    /// Finds the header row of a sheet within the first
    /// [`DetectorConfig::header_scan_rows`] rows.
    pub fn locate(&self, sheet: &Worksheet, choice: TemplateChoice) -> Result<HeaderMatch> {
        let window = sheet.len().min(self.config.header_scan_rows);

        match choice {
            TemplateChoice::Detect => {
                for row in 0..window {
                    match self.detect(&sheet.row_text(row)) {
                        Ok(template) => return Ok(HeaderMatch { template, row }),
                        Err(ResolutionError::NoMatch) => continue,
                        Err(ambiguous) => return Err(ambiguous.into()),
                    }
                }
                Err(ResolutionError::NoMatch.into())
            }
            TemplateChoice::Explicit(template) => {
                let descriptor = self.catalog.descriptor_for(template)?;
                (0..window)
                    .find(|&row| {
                        let tokens = header_tokens(&sheet.row_text(row));
                        overlap(descriptor, &tokens) >= self.config.min_overlap
                    })
                    .map(|row| HeaderMatch { template, row })
                    .ok_or_else(|| {
                        ConfigurationMismatch::HeaderNotFound {
                            template,
                            scanned: window,
                        }
                        .into()
                    })
            }
        }
    }
}

/// Case-folds a header cell and collapses its whitespace.
pub fn normalize_header(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn header_tokens<S: AsRef<str>>(header: &[S]) -> Vec<String> {
    header
        .iter()
        .map(|value| normalize_header(value.as_ref()))
        .filter(|token| !token.is_empty())
        .collect()
}

/// True when some token equals or contains one of the aliases.
pub fn label_matches(aliases: &[&str], tokens: &[String]) -> bool {
    aliases
        .iter()
        .any(|alias| tokens.iter().any(|token| token.contains(alias)))
}

/// Fraction of the descriptor's labels present among `tokens`.
pub fn overlap(descriptor: &TemplateDescriptor, tokens: &[String]) -> f64 {
    if descriptor.labels.is_empty() || tokens.is_empty() {
        return 0.0;
    }
    let matched = descriptor
        .labels
        .iter()
        .filter(|aliases| label_matches(aliases, tokens))
        .count();
    matched as f64 / descriptor.labels.len() as f64
}
