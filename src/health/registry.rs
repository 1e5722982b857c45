//! Which checks run for which application

use std::fmt;
use std::str::FromStr;

use super::check::Check;
use crate::error::DiagnosticsError;

/// Applications that run startup diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationId {
    Mcda,
    Gemtc,
    Patavi,
}

impl ApplicationId {
    pub const ALL: [ApplicationId; 3] =
        [ApplicationId::Mcda, ApplicationId::Gemtc, ApplicationId::Patavi];

    /// Canonical name, as used in reports and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationId::Mcda => "MCDA",
            ApplicationId::Gemtc => "GeMTC",
            ApplicationId::Patavi => "Patavi",
        }
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationId {
    type Err = DiagnosticsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|app| app.as_str().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| DiagnosticsError::UnknownApplication {
                name: name.to_string(),
                expected: Self::ALL.map(|app| app.as_str()).join(", "),
            })
    }
}

const PATAVI_CLIENT_CHECKS: &[Check] = &[Check::Database, Check::Patavi];

const PATAVI_SERVER_CHECKS: &[Check] = &[Check::Database, Check::Certificates, Check::Broker];

/// Ordered checks for `app`; never empty
pub fn checks_for(app: ApplicationId) -> &'static [Check] {
    match app {
        ApplicationId::Mcda | ApplicationId::Gemtc => PATAVI_CLIENT_CHECKS,
        ApplicationId::Patavi => PATAVI_SERVER_CHECKS,
    }
}

/// Ordered checks for the application called `name`
///
/// Unknown names are rejected rather than treated as "nothing to check".
pub fn get_checks(name: &str) -> Result<&'static [Check], DiagnosticsError> {
    Ok(checks_for(name.parse()?))
}
