use serde::{Serialize, Serializer};

pub const DEFAULT_GRADIENT: &str = "PinkPurple";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// A named two-colour gradient, drawn left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    pub name: &'static str,
    pub from: Rgb,
    pub to: Rgb,
}

const GRADIENTS: [Gradient; 5] = [
    Gradient {
        name: "PinkPurple",
        from: Rgb::new(0x0C, 0xDB, 0x47),
        to: Rgb::new(0x00, 0x57, 0xFF),
    },
    Gradient {
        name: "BlueGreen",
        from: Rgb::new(0xED, 0xD7, 0x13),
        to: Rgb::new(0xF4, 0x11, 0x11),
    },
    Gradient {
        name: "RedOrange",
        from: Rgb::new(0xFF, 0x00, 0x5C),
        to: Rgb::new(0x00, 0x38, 0xFF),
    },
    Gradient {
        name: "YellowPink",
        from: Rgb::new(0x0C, 0xDB, 0x47),
        to: Rgb::new(0xED, 0xD7, 0x13),
    },
    Gradient {
        name: "GrayBlack",
        from: Rgb::new(0xBC, 0x0E, 0xFA),
        to: Rgb::new(0xFF, 0x00, 0x5C),
    },
];

impl Gradient {
    pub fn all() -> &'static [Gradient] {
        &GRADIENTS
    }

    /// Never fails: unknown or empty names resolve to the first gradient.
    pub fn lookup(name: &str) -> &'static Gradient {
        GRADIENTS
            .iter()
            .find(|gradient| gradient.name == name)
            .unwrap_or(&GRADIENTS[0])
    }

    pub fn is_known(name: &str) -> bool {
        GRADIENTS.iter().any(|gradient| gradient.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_named_gradient() {
        let gradient = Gradient::lookup("RedOrange");
        assert_eq!(gradient.name, "RedOrange");
        assert_eq!(gradient.from.to_hex(), "#FF005C");
        assert_eq!(gradient.to.to_hex(), "#0038FF");
    }

    #[test]
    fn lookup_is_total() {
        for name in ["", "pinkpurple", "Rainbow", " PinkPurple", "🙂"] {
            assert_eq!(Gradient::lookup(name).name, DEFAULT_GRADIENT);
        }
    }

    #[test]
    fn default_is_first_entry() {
        assert_eq!(Gradient::all()[0].name, DEFAULT_GRADIENT);
        assert!(Gradient::is_known(DEFAULT_GRADIENT));
        assert!(!Gradient::is_known("Teal"));
    }

    #[test]
    fn serializes_colours_as_hex() {
        let json = serde_json::to_value(Gradient::lookup("GrayBlack")).unwrap();
        assert_eq!(json["name"], "GrayBlack");
        assert_eq!(json["from"], "#BC0EFA");
        assert_eq!(json["to"], "#FF005C");
    }
}
