//! Registry detection and owner extraction for whois responses.
//!
//! Each regional registry formats its free-text answer differently. The
//! response is attributed to the first registry whose name appears in it
//! (ARIN, RIPE NCC, APNIC, LACNIC, AFRINIC), then that registry's fields are
//! tried in order. Unattributed responses try every known field.

use std::sync::OnceLock;

use log::warn;
use regex::Regex;

/// Owner label when no field could be extracted
pub const UNKNOWN_OWNER: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registry {
    Arin,
    Ripe,
    Apnic,
    Lacnic,
    Afrinic,
    Generic,
}

/// A `name: value` field in a whois body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    OrgName,
    OrgNameLower,
    NetName,
    NetNameLower,
    Owner,
}

impl Field {
    const ALL: [Field; 5] =
        [Field::OrgName, Field::OrgNameLower, Field::NetName, Field::NetNameLower, Field::Owner];

    fn label(self) -> &'static str {
        match self {
            Field::OrgName => "OrgName",
            Field::OrgNameLower => "org-name",
            Field::NetName => "NetName",
            Field::NetNameLower => "netname",
            Field::Owner => "owner",
        }
    }

    fn regex(self) -> Option<&'static Regex> {
        static PATTERNS: OnceLock<Vec<(Field, Regex)>> = OnceLock::new();
        PATTERNS
            .get_or_init(|| {
                Field::ALL
                    .iter()
                    .filter_map(|field| {
                        let pattern = format!(r"{}:[ \t]*(.*)", regex::escape(field.label()));
                        match Regex::new(&pattern) {
                            Ok(re) => Some((*field, re)),
                            Err(e) => {
                                warn!("Invalid whois field pattern {pattern}: {e}");
                                None
                            }
                        }
                    })
                    .collect()
            })
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, re)| re)
    }

    /// First non-blank value of this field in `raw`
    fn extract(self, raw: &str) -> Option<String> {
        let captures = self.regex()?.captures(raw)?;
        let value = captures.get(1)?.as_str().trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

impl Registry {
    const PRIORITY: [(Registry, &'static str); 5] = [
        (Registry::Arin, "ARIN"),
        (Registry::Ripe, "RIPE NCC"),
        (Registry::Apnic, "APNIC"),
        (Registry::Lacnic, "LACNIC"),
        (Registry::Afrinic, "AFRINIC"),
    ];

    /// Attribute a raw response to a registry; first match wins
    #[must_use]
    pub fn detect(raw: &str) -> Self {
        Self::PRIORITY
            .iter()
            .find(|(_, marker)| raw.contains(*marker))
            .map_or(Registry::Generic, |(registry, _)| *registry)
    }

    fn fields(self) -> &'static [Field] {
        match self {
            Registry::Arin => &[Field::OrgName, Field::NetName],
            Registry::Ripe | Registry::Apnic | Registry::Afrinic => {
                &[Field::OrgNameLower, Field::NetNameLower]
            }
            Registry::Lacnic => &[Field::Owner],
            Registry::Generic => &Field::ALL,
        }
    }

    /// Owner name from a response this registry produced
    #[must_use]
    pub fn extract(self, raw: &str) -> String {
        self.fields()
            .iter()
            .find_map(|field| field.extract(raw))
            .unwrap_or_else(|| UNKNOWN_OWNER.to_string())
    }
}

/// Detect the registry and extract the owner in one step
#[must_use]
pub fn extract_owner(raw: &str) -> String {
    Registry::detect(raw).extract(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARIN: &str = "\
# ARIN WHOIS data and services are subject to the Terms of Use
NetRange:       93.184.216.0 - 93.184.216.255
NetName:        EDGECAST-NETBLK-03
OrgName:        Edgecast Inc.
";

    const RIPE: &str = "\
% This is the RIPE Database query service.
% The objects are in RPSL format. RIPE NCC
inetnum:        193.0.0.0 - 193.0.7.255
netname:        RIPE-NCC
org-name:       Reseaux IP Europeens Network Coordination Centre (RIPE NCC)
";

    const LACNIC: &str = "\
% LACNIC Joint Whois - whois.lacnic.net
inetnum:     200.160.0.0/20
owner:       Núcleo de Inf. e Coord. do Ponto BR - NIC.BR
";

    #[test]
    fn test_detect_priority() {
        assert_eq!(Registry::detect(ARIN), Registry::Arin);
        assert_eq!(Registry::detect(RIPE), Registry::Ripe);
        assert_eq!(Registry::detect(LACNIC), Registry::Lacnic);
        // ARIN outranks APNIC when both appear
        assert_eq!(Registry::detect("APNIC ... see ARIN"), Registry::Arin);
        assert_eq!(Registry::detect("nothing here"), Registry::Generic);
    }

    #[test]
    fn test_arin_prefers_org_name() {
        assert_eq!(extract_owner(ARIN), "Edgecast Inc.");
        assert_eq!(extract_owner("ARIN\nNetName: FALLBACK-NET\n"), "FALLBACK-NET");
    }

    #[test]
    fn test_ripe_and_lacnic() {
        assert_eq!(
            extract_owner(RIPE),
            "Reseaux IP Europeens Network Coordination Centre (RIPE NCC)"
        );
        assert_eq!(extract_owner(LACNIC), "Núcleo de Inf. e Coord. do Ponto BR - NIC.BR");
    }

    #[test]
    fn test_generic_and_unknown() {
        assert_eq!(extract_owner("netname: SOME-NET\n"), "SOME-NET");
        assert_eq!(extract_owner("no fields at all"), UNKNOWN_OWNER);
        // A blank value does not swallow the next line
        assert_eq!(extract_owner("OrgName:\nnetname: NEXT\n"), "NEXT");
    }
}
