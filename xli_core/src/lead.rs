use std::fmt::{self, Write as _};

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, XliError};
use crate::format::{LEAD_SET_STD_12, RECONSTRUCTED_LEAD_COUNT};

const LEAD_NAMES: [&str; 12] = [
    "Lead I", "Lead II", "Lead III", "Lead aVR", "Lead aVL", "Lead aVF", "Lead V1", "Lead V2",
    "Lead V3", "Lead V4", "Lead V5", "Lead V6",
];

/// Samples written per line by [`render_plain`].
pub const VALUES_PER_LINE: usize = 25;

/// Display name for the lead at `index` in the standard layout.
pub fn lead_name(index: usize) -> &'static str {
    LEAD_NAMES.get(index).copied().unwrap_or("Unknown Lead")
}

/// Whether `lead_set` names the standard 12-lead layout (case-insensitive).
pub fn is_standard_lead_set(lead_set: &str) -> bool {
    lead_set.eq_ignore_ascii_case(LEAD_SET_STD_12)
}

/// The decoded signal for one lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedLead {
    pub name: String,
    pub samples: Vec<i32>,
}

impl DecodedLead {
    pub fn new(index: usize, samples: Vec<i32>) -> Self {
        Self {
            name: lead_name(index).to_string(),
            samples,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl fmt::Display for DecodedLead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} samples)", self.name, self.samples.len())
    }
}

/// Result of turning decoded payload leads into a named lead set.
///
/// `Unrecognized` is not a failure: the record simply uses a layout this
/// decoder does not reconstruct. Callers must handle it explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadSetOutcome {
    Leads(Vec<DecodedLead>),
    Unrecognized { lead_set: String },
}

impl LeadSetOutcome {
    pub fn leads(&self) -> Option<&[DecodedLead]> {
        match self {
            LeadSetOutcome::Leads(leads) => Some(leads),
            LeadSetOutcome::Unrecognized { .. } => None,
        }
    }

    pub fn into_leads(self) -> Option<Vec<DecodedLead>> {
        match self {
            LeadSetOutcome::Leads(leads) => Some(leads),
            LeadSetOutcome::Unrecognized { .. } => None,
        }
    }
}

/// Name the decoded leads and reconstruct the derived limb leads.
///
/// Only the standard 12-lead layout is handled; anything else yields
/// [`LeadSetOutcome::Unrecognized`] without touching the data. At most
/// `max_leads` leads are kept, in payload order.
pub fn create_from_lead_set(
    lead_set: &str,
    lead_data: Vec<Vec<i32>>,
    max_leads: usize,
) -> Result<LeadSetOutcome> {
    if !is_standard_lead_set(lead_set) {
        debug!(lead_set, "lead set is not reconstructable");
        return Ok(LeadSetOutcome::Unrecognized {
            lead_set: lead_set.to_string(),
        });
    }

    let mut leads: Vec<DecodedLead> = lead_data
        .into_iter()
        .take(max_leads)
        .enumerate()
        .map(|(index, samples)| DecodedLead::new(index, samples))
        .collect();

    reconstitute_leads(&mut leads)?;
    Ok(LeadSetOutcome::Leads(leads))
}

/// Rebuild leads III, aVR, aVL and aVF in place from leads I and II.
///
/// The device transmits residuals for these four leads. Per sample `k`:
///
/// ```text
/// III[k] = II[k] - I[k] - III[k]
/// aVR[k] = -aVR[k] - (I[k] + II[k]) / 2
/// aVL[k] = (I[k] - III[k]) / 2 - aVL[k]
/// aVF[k] = (II[k] + III[k]) / 2 - aVF[k]
/// ```
///
/// III must be rebuilt first: aVL and aVF read the corrected III. Division
/// truncates toward zero and all arithmetic wraps at 32 bits. Each identity
/// runs over the shortest of the leads it touches.
pub fn reconstitute_leads(leads: &mut [DecodedLead]) -> Result<()> {
    if leads.len() < RECONSTRUCTED_LEAD_COUNT {
        return Err(XliError::MissingLeads {
            found: leads.len(),
            required: RECONSTRUCTED_LEAD_COUNT,
        });
    }

    let (primary, derived) = leads.split_at_mut(2);
    let lead_i = &primary[0].samples;
    let lead_ii = &primary[1].samples;
    let (lead_iii, augmented) = derived.split_at_mut(1);
    let lead_iii = &mut lead_iii[0].samples;

    for ((iii, &i), &ii) in lead_iii.iter_mut().zip(lead_i).zip(lead_ii) {
        *iii = ii.wrapping_sub(i).wrapping_sub(*iii);
    }
    let lead_iii = &*lead_iii;

    for ((avr, &i), &ii) in augmented[0].samples.iter_mut().zip(lead_i).zip(lead_ii) {
        *avr = avr.wrapping_neg().wrapping_sub(i.wrapping_add(ii) / 2);
    }

    for ((avl, &i), &iii) in augmented[1].samples.iter_mut().zip(lead_i).zip(lead_iii) {
        *avl = (i.wrapping_sub(iii) / 2).wrapping_sub(*avl);
    }

    for ((avf, &ii), &iii) in augmented[2].samples.iter_mut().zip(lead_ii).zip(lead_iii) {
        *avf = (ii.wrapping_add(iii) / 2).wrapping_sub(*avf);
    }

    Ok(())
}

/// Render leads as whitespace-delimited decimal text, back to back.
///
/// Within each lead a newline follows every sample whose index is a
/// non-zero multiple of [`VALUES_PER_LINE`]; every other sample is followed
/// by a space.
pub fn render_plain(leads: &[DecodedLead]) -> String {
    let mut out = String::new();
    for lead in leads {
        for (count, value) in lead.samples.iter().enumerate() {
            // Writing into a String cannot fail.
            let _ = write!(out, "{value}");
            if count % VALUES_PER_LINE > 0 || count == 0 {
                out.push(' ');
            } else {
                out.push('\n');
            }
        }
    }
    out
}
