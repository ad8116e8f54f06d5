//! Domain enumerations shared by the endpoint groups

use serde::{Deserialize, Serialize};

/// Reference genome assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assembly {
  GRCh37,
  GRCh38,
}

impl std::fmt::Display for Assembly {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Assembly::GRCh37 => write!(f, "GRCh37"),
      Assembly::GRCh38 => write!(f, "GRCh38"),
    }
  }
}

impl std::str::FromStr for Assembly {
  type Err = crate::Error;

  fn from_str(s: &str) -> crate::Result<Self> {
    match s {
      "GRCh37" => Ok(Assembly::GRCh37),
      "GRCh38" => Ok(Assembly::GRCh38),
      other => Err(crate::Error::InvalidParameter(format!("Unknown assembly '{}'", other))),
    }
  }
}

/// Sequencing programme a case belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Program {
  RareDisease,
  Cancer,
}

impl std::fmt::Display for Program {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Program::RareDisease => write!(f, "rare_disease"),
      Program::Cancer => write!(f, "cancer"),
    }
  }
}

impl Program {
  /// Path segment used by the data intake endpoints
  pub fn path_segment(&self) -> &'static str {
    match self {
      Program::RareDisease => "rd",
      Program::Cancer => "cancer",
    }
  }
}

/// Kind of report event recorded against a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportEventType {
  GenomicsEnglandTiering,
  Candidate,
  Reported,
  Questionnaire,
}

impl std::fmt::Display for ReportEventType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReportEventType::GenomicsEnglandTiering => write!(f, "genomics_england_tiering"),
      ReportEventType::Candidate => write!(f, "candidate"),
      ReportEventType::Reported => write!(f, "reported"),
      ReportEventType::Questionnaire => write!(f, "questionnaire"),
    }
  }
}

impl std::str::FromStr for ReportEventType {
  type Err = crate::Error;

  fn from_str(s: &str) -> crate::Result<Self> {
    match s {
      "genomics_england_tiering" => Ok(ReportEventType::GenomicsEnglandTiering),
      "candidate" => Ok(ReportEventType::Candidate),
      "reported" => Ok(ReportEventType::Reported),
      "questionnaire" => Ok(ReportEventType::Questionnaire),
      other => {
        Err(crate::Error::InvalidParameter(format!("Invalid report event type '{}'", other)))
      }
    }
  }
}
