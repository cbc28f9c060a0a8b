//! Parsers for the semi-structured descriptor column of the reference tables.
//!
//! Region descriptors look like `"California"` or `"Ontario, Canada"`.
//! Airport descriptors look like `"San Francisco, CA: San Francisco International"`,
//! with `:` separating the location from the airport name and `,` separating
//! the city from the region code inside the location.

/// Splits `value` on `delimiter` and trims whitespace from every part.
/// Empty parts are kept, so `"a,"` yields `["a", ""]`.
pub fn split_trim(value: &str, delimiter: char) -> Vec<&str> {
    value.split(delimiter).map(str::trim).collect()
}

/// Parsed form of a region descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionDescriptor<'a> {
    /// A single name, or a list with more than two parts of which only the
    /// first is kept. `dropped` counts the discarded parts.
    State { name: &'a str, dropped: usize },
    /// Exactly `name, country`.
    Province { name: &'a str, country: &'a str },
}

impl<'a> RegionDescriptor<'a> {
    pub fn parse(descriptor: &'a str) -> Self {
        let parts = split_trim(descriptor, ',');
        match parts[..] {
            [name, country] => RegionDescriptor::Province { name, country },
            [name, ..] => RegionDescriptor::State {
                name,
                dropped: parts.len() - 1,
            },
            // str::split always yields at least one part
            [] => RegionDescriptor::State {
                name: "",
                dropped: 0,
            },
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            RegionDescriptor::State { name, .. } | RegionDescriptor::Province { name, .. } => name,
        }
    }

    /// Number of comma-separated parts silently discarded by the lenient grammar.
    pub fn dropped_parts(&self) -> usize {
        match *self {
            RegionDescriptor::State { dropped, .. } => dropped,
            RegionDescriptor::Province { .. } => 0,
        }
    }
}

/// Parsed form of an airport descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirportDescriptor<'a> {
    /// `"<city>, <region code>: <name>"`.
    Located {
        city: &'a str,
        region_code: &'a str,
        name: &'a str,
    },
    /// `"<location>: <name>"` where the location is not a `city, code` pair.
    NameOnly { location: &'a str, name: &'a str },
    /// No colon, or more than one. `segments` is the number of colon-separated
    /// pieces (1 when there is no colon).
    Unstructured { raw: &'a str, segments: usize },
}

impl<'a> AirportDescriptor<'a> {
    pub fn parse(descriptor: &'a str) -> Self {
        let parts = split_trim(descriptor, ':');
        let [location, name] = parts[..] else {
            return AirportDescriptor::Unstructured {
                raw: descriptor,
                segments: parts.len(),
            };
        };

        match split_trim(location, ',')[..] {
            [city, region_code] => AirportDescriptor::Located {
                city,
                region_code,
                name,
            },
            _ => AirportDescriptor::NameOnly { location, name },
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            AirportDescriptor::Located { name, .. } | AirportDescriptor::NameOnly { name, .. } => {
                name
            }
            AirportDescriptor::Unstructured { raw, .. } => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_trim_keeps_empty_parts() {
        assert_eq!(split_trim(" a , b ", ','), vec!["a", "b"]);
        assert_eq!(split_trim("a,", ','), vec!["a", ""]);
        assert_eq!(split_trim("", ','), vec![""]);
    }

    #[test]
    fn region_single_name_is_state() {
        assert_eq!(
            RegionDescriptor::parse(" California "),
            RegionDescriptor::State {
                name: "California",
                dropped: 0
            }
        );
    }

    #[test]
    fn region_name_and_country_is_province() {
        assert_eq!(
            RegionDescriptor::parse("Ontario,  Canada"),
            RegionDescriptor::Province {
                name: "Ontario",
                country: "Canada"
            }
        );
    }

    #[test]
    fn region_with_extra_parts_keeps_first() {
        let parsed = RegionDescriptor::parse("Quebec, Canada, North America");
        assert_eq!(parsed.name(), "Quebec");
        assert_eq!(parsed.dropped_parts(), 2);
        assert!(matches!(parsed, RegionDescriptor::State { .. }));
    }

    #[test]
    fn airport_city_and_code() {
        assert_eq!(
            AirportDescriptor::parse("San Francisco, CA: San Francisco International"),
            AirportDescriptor::Located {
                city: "San Francisco",
                region_code: "CA",
                name: "San Francisco International",
            }
        );
    }

    #[test]
    fn airport_location_without_region() {
        assert_eq!(
            AirportDescriptor::parse("Paris: Charles de Gaulle"),
            AirportDescriptor::NameOnly {
                location: "Paris",
                name: "Charles de Gaulle",
            }
        );
        assert_eq!(
            AirportDescriptor::parse("Rome, Lazio, IT: Fiumicino").name(),
            "Fiumicino"
        );
    }

    #[test]
    fn airport_without_colon_is_unstructured() {
        assert_eq!(
            AirportDescriptor::parse("Some Remote Airport"),
            AirportDescriptor::Unstructured {
                raw: "Some Remote Airport",
                segments: 1,
            }
        );
    }

    #[test]
    fn airport_with_two_colons_keeps_whole_text() {
        let raw = "Tokyo, JP: Haneda: Terminal 3";
        let parsed = AirportDescriptor::parse(raw);
        assert_eq!(parsed, AirportDescriptor::Unstructured { raw, segments: 3 });
        assert_eq!(parsed.name(), raw);
    }
}
