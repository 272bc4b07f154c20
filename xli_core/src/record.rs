use crate::codec::PayloadShape;
use crate::error::{Result, XliError};
use crate::format::{COMPRESSION_NONE, COMPRESSION_XLI, LEAD_SET_STD_12, STD_12_LEAD_COUNT};

/// Document types written by Sierra ECG devices and their Philips successors.
pub const SUPPORTED_DOCUMENT_TYPES: &[&str] = &["SierraECG", "PhilipsECG"];

/// Waveform fields of one resting-ECG record, as lifted out of its XML.
///
/// Parsing the XML itself happens elsewhere; this is the boundary the decoder
/// works against. Which fields are meaningful depends on the [`Dialect`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaveformRecord {
    /// `documentinfo/documenttype`, when the caller has it.
    pub document_type: Option<String>,
    /// `documentinfo/documentversion`, e.g. "1.03" or "1.04.01".
    pub document_version: String,
    /// `reportinfo/reporttype` (1.03), e.g. "STD-12".
    pub report_type: Option<String>,
    /// `parsedwaveforms/@numberofleads` (1.04).
    pub number_of_leads: Option<usize>,
    /// `parsedwaveforms/@leadlabels` (1.04), space separated.
    pub lead_labels: Option<String>,
    /// `parsedwaveforms/@compressflag` (1.03).
    pub compress_flag: bool,
    /// `@compressmethod` (1.03) or `@compression` (1.04).
    pub compression_method: Option<String>,
    /// Samples per lead for uncompressed payloads, from duration × sampling rate.
    pub samples_per_lead: Option<usize>,
    /// Waveform payload after Base64 decoding.
    pub payload: Vec<u8>,
}

/// How a record's payload is compressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compression {
    /// Plain little-endian 16-bit samples.
    None,
    Xli,
    Other(String),
}

impl Compression {
    /// Classify a compression method attribute. A missing or empty attribute,
    /// or "Uncompressed", means no compression.
    pub fn from_method(method: Option<&str>) -> Self {
        match method.map(str::trim) {
            None | Some("") => Compression::None,
            Some(m) if m.eq_ignore_ascii_case(COMPRESSION_NONE) => Compression::None,
            Some(m) if m.eq_ignore_ascii_case(COMPRESSION_XLI) => Compression::Xli,
            Some(m) => Compression::Other(m.to_string()),
        }
    }
}

/// XML schema dialects. Each one stores the lead set and the compression
/// method in different places; the payload format is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    V1_03,
    V1_04,
}

impl Dialect {
    /// Pick the dialect from a `documentversion` string.
    pub fn sniff(version: &str) -> Result<Self> {
        match version.trim() {
            "1.03" => Ok(Dialect::V1_03),
            "1.04" | "1.04.01" | "1.04.02" => Ok(Dialect::V1_04),
            other => Err(XliError::UnsupportedVersion(other.to_string())),
        }
    }

    /// Select the dialect for `record`, checking its document type on the way.
    pub fn for_record(record: &WaveformRecord) -> Result<Self> {
        if let Some(doc_type) = record.document_type.as_deref() {
            if !SUPPORTED_DOCUMENT_TYPES.contains(&doc_type.trim()) {
                return Err(XliError::UnsupportedDocumentType(doc_type.to_string()));
            }
        }
        Self::sniff(&record.document_version)
    }

    pub fn version(&self) -> &'static str {
        match self {
            Dialect::V1_03 => "1.03",
            Dialect::V1_04 => "1.04",
        }
    }

    /// Lead-set identifier used to gate reconstruction.
    ///
    /// 1.04 records carry a lead count instead of a report type; twelve leads
    /// map onto the 1.03 "STD-12" name, anything else becomes
    /// "<count> <labels>" which never matches a reconstructable layout.
    pub fn lead_set(&self, record: &WaveformRecord) -> String {
        match self {
            Dialect::V1_03 => record.report_type.clone().unwrap_or_default(),
            Dialect::V1_04 => match record.number_of_leads {
                Some(STD_12_LEAD_COUNT) => LEAD_SET_STD_12.to_string(),
                Some(count) => format!(
                    "{} {}",
                    count,
                    record.lead_labels.as_deref().unwrap_or_default()
                ),
                None => record.report_type.clone().unwrap_or_default(),
            },
        }
    }

    pub fn compression(&self, record: &WaveformRecord) -> Compression {
        match self {
            Dialect::V1_03 if !record.compress_flag => Compression::None,
            Dialect::V1_03 | Dialect::V1_04 => {
                Compression::from_method(record.compression_method.as_deref())
            }
        }
    }

    /// Payload layout hints for codecs that need them.
    pub fn shape(&self, record: &WaveformRecord) -> PayloadShape {
        PayloadShape {
            lead_count: record.number_of_leads.unwrap_or(0),
            samples_per_lead: record.samples_per_lead,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_known_versions() {
        assert_eq!(Dialect::sniff("1.03").unwrap(), Dialect::V1_03);
        assert_eq!(Dialect::sniff("1.04").unwrap(), Dialect::V1_04);
        assert_eq!(Dialect::sniff(" 1.04.02 ").unwrap(), Dialect::V1_04);
        assert!(matches!(
            Dialect::sniff("2.0"),
            Err(XliError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }

    #[test]
    fn rejects_foreign_document_types() {
        let record = WaveformRecord {
            document_type: Some("HL7aECG".into()),
            document_version: "1.04".into(),
            ..Default::default()
        };
        assert!(matches!(
            Dialect::for_record(&record),
            Err(XliError::UnsupportedDocumentType(_))
        ));
    }

    #[test]
    fn v1_03_reads_report_type_and_flag() {
        let record = WaveformRecord {
            document_version: "1.03".into(),
            report_type: Some("STD-12".into()),
            compress_flag: true,
            compression_method: Some("XLI".into()),
            ..Default::default()
        };
        let dialect = Dialect::for_record(&record).unwrap();
        assert_eq!(dialect.lead_set(&record), "STD-12");
        assert_eq!(dialect.compression(&record), Compression::Xli);

        let unflagged = WaveformRecord {
            compress_flag: false,
            ..record
        };
        assert_eq!(dialect.compression(&unflagged), Compression::None);
    }

    #[test]
    fn v1_04_maps_twelve_leads_to_std_12() {
        let record = WaveformRecord {
            document_version: "1.04.01".into(),
            number_of_leads: Some(12),
            compression_method: Some("XLI".into()),
            ..Default::default()
        };
        let dialect = Dialect::for_record(&record).unwrap();
        assert_eq!(dialect.lead_set(&record), "STD-12");
        assert_eq!(dialect.compression(&record), Compression::Xli);
        assert_eq!(dialect.shape(&record).lead_count, 12);
    }

    #[test]
    fn v1_04_other_lead_counts_are_labelled() {
        let record = WaveformRecord {
            document_version: "1.04".into(),
            number_of_leads: Some(15),
            lead_labels: Some("I II III".into()),
            ..Default::default()
        };
        assert_eq!(Dialect::V1_04.lead_set(&record), "15 I II III");
    }

    #[test]
    fn classifies_compression_methods() {
        assert_eq!(Compression::from_method(None), Compression::None);
        assert_eq!(Compression::from_method(Some("Uncompressed")), Compression::None);
        assert_eq!(Compression::from_method(Some("xli")), Compression::Xli);
        assert_eq!(
            Compression::from_method(Some("ZIP")),
            Compression::Other("ZIP".into())
        );
    }
}
