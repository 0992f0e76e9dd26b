// ABOUTME: Parsed +SBDIX reply describing the outcome of one SBD session attempt
// ABOUTME: Exposes MO classification and MT disposition for the session retry loop

use std::fmt;

use crate::client::error::{SbdError, SbdResult};
use crate::datatypes::reply::parse_fields;
use crate::datatypes::status::{MoOutcome, MtStatus, classify_mo};

/// Prefix of the `AT+SBDIX` reply line
pub const SBDIX_PREFIX: &str = "+SBDIX:";

/// `+SBDIX:<MO status>,<MOMSN>,<MT status>,<MTMSN>,<MT length>,<MT queued>`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    /// Disposition of the mobile originated transaction
    pub mo_status: i32,
    /// Sequence number used for the MO message
    pub mo_msn: i32,
    /// Raw MT status code, see [`MtStatus`]
    pub mt_status: i32,
    /// Sequence number of the MT message, -1 when none was received
    pub mt_msn: i32,
    /// Length in bytes of the received MT message
    pub mt_length: i32,
    /// MT messages still queued at the gateway
    pub mt_queued: i32,
}

impl SessionStatus {
    /// Parse a reply accumulated from `AT+SBDIX`.
    pub fn parse(reply: &str) -> SbdResult<Self> {
        let [mo_status, mo_msn, mt_status, mt_msn, mt_length, mt_queued] =
            parse_fields::<6>(reply, SBDIX_PREFIX)?;
        Ok(Self {
            mo_status,
            mo_msn,
            mt_status,
            mt_msn,
            mt_length,
            mt_queued,
        })
    }

    pub fn mo_outcome(&self) -> MoOutcome {
        classify_mo(self.mo_status)
    }

    pub fn mt(&self) -> MtStatus {
        MtStatus::from_code(self.mt_status)
    }

    /// `Ok` when the MO part completed, otherwise the matching session error.
    pub fn check_mo(&self) -> SbdResult<()> {
        match self.mo_outcome() {
            MoOutcome::Success => Ok(()),
            MoOutcome::FatalFailure => Err(SbdError::SessionFatal {
                code: self.mo_status,
            }),
            MoOutcome::RetryableFailure | MoOutcome::Unknown => Err(SbdError::SessionRetryable {
                code: self.mo_status,
            }),
        }
    }
}

impl fmt::Display for SessionStatus {
    /// Formats the status the way the transceiver reports it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{SBDIX_PREFIX} {}, {}, {}, {}, {}, {}",
            self.mo_status, self.mo_msn, self.mt_status, self.mt_msn, self.mt_length, self.mt_queued
        )
    }
}
