// ABOUTME: Parsed +SBDSX reply describing the MO/MT buffers and ring alert state
// ABOUTME: Shared by the timeout diagnostic and the explicit buffer-clearing maintenance path

use std::fmt;

use crate::client::error::SbdResult;
use crate::datatypes::reply::parse_fields;

/// Prefix of the `AT+SBDSX` reply line
pub const SBDSX_PREFIX: &str = "+SBDSX:";

/// `+SBDSX:<MO flag>,<MOMSN>,<MT flag>,<MTMSN>,<RA flag>,<msg waiting>`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BufferStatus {
    /// 1 when a message sits in the mobile originated buffer
    pub mo_flag: i32,
    /// Sequence number for the next MO session
    pub mo_msn: i32,
    /// 1 when a message sits in the mobile terminated buffer
    pub mt_flag: i32,
    /// Sequence number of the most recent MT session, -1 when the buffer is empty
    pub mt_msn: i32,
    /// 1 when an SBD ring alert has been received and needs answering
    pub ring_alert: i32,
    /// MT messages queued at the gateway awaiting collection
    pub queued: i32,
}

impl BufferStatus {
    pub fn parse(reply: &str) -> SbdResult<Self> {
        let [mo_flag, mo_msn, mt_flag, mt_msn, ring_alert, queued] =
            parse_fields::<6>(reply, SBDSX_PREFIX)?;
        Ok(Self {
            mo_flag,
            mo_msn,
            mt_flag,
            mt_msn,
            ring_alert,
            queued,
        })
    }

    pub fn has_mo_message(&self) -> bool {
        self.mo_flag == 1
    }

    pub fn has_mt_message(&self) -> bool {
        self.mt_flag == 1
    }

    pub fn is_empty(&self) -> bool {
        !self.has_mo_message() && !self.has_mt_message()
    }
}

impl fmt::Display for BufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{SBDSX_PREFIX} {}, {}, {}, {}, {}, {}",
            self.mo_flag, self.mo_msn, self.mt_flag, self.mt_msn, self.ring_alert, self.queued
        )
    }
}
