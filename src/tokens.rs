//! Enumerations the solver accepts either as a numeric code or as a
//! symbolic token. Both forms are accepted on input and normalised
//! into the enum right away. Serialization to YAML uses the token,
//! the control files use the code.
use std::fmt;
use std::str::FromStr;

use serde::de;
use serde::de::Visitor;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

macro_rules! token_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal, { $($variant:ident => ($code:literal, $token:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(&self) -> i64 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn token(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }

            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn from_token(token: &str) -> Option<Self> {
                match token.trim().to_lowercase().as_str() {
                    $($token => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn expected() -> String {
                let options: Vec<_> = Self::ALL
                    .iter()
                    .map(|v| format!("{} or '{}'", v.code(), v.token()))
                    .collect();
                format!("{} ({})", $what, options.join(", "))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.token())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if let Ok(code) = s.trim().parse::<i64>() {
                    return Self::from_code(code)
                        .ok_or_else(|| format!("unknown code {}, expected {}", code, Self::expected()));
                }
                Self::from_token(s)
                    .ok_or_else(|| format!("unknown token '{}', expected {}", s, Self::expected()))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.token())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct TokenVisitor;

                impl<'de> Visitor<'de> for TokenVisitor {
                    type Value = $name;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str(&$name::expected())
                    }

                    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                        $name::from_code(value).ok_or_else(|| {
                            E::custom(format!("unknown code {}, expected {}", value, $name::expected()))
                        })
                    }

                    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                        let code = i64::try_from(value)
                            .map_err(|_| E::custom(format!("code {} out of range", value)))?;
                        self.visit_i64(code)
                    }

                    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                        value.parse().map_err(E::custom)
                    }
                }

                deserializer.deserialize_any(TokenVisitor)
            }
        }
    };
}

token_enum!(
    /// Boundary condition on one side of one dimension.
    BoundaryCondition, "boundary condition", {
        User => (0, "user"),
        Extrap => (1, "extrap"),
        Periodic => (2, "periodic"),
        Wall => (3, "wall"),
    }
);

token_enum!(
    /// Limiter applied to one wave family.
    Limiter, "limiter", {
        None => (0, "none"),
        Minmod => (1, "minmod"),
        Superbee => (2, "superbee"),
        VanLeer => (3, "vanleer"),
        Mc => (4, "mc"),
    }
);

token_enum!(
    /// How waves are propagated transversely in the unsplit method.
    TransverseWaves, "transverse waves", {
        None => (0, "none"),
        Increment => (1, "increment"),
        All => (2, "all"),
    }
);

token_enum!(
    SourceSplit, "source splitting", {
        None => (0, "none"),
        Godunov => (1, "godunov"),
        Strang => (2, "strang"),
    }
);

token_enum!(
    DimensionalSplit, "dimensional splitting", {
        Unsplit => (0, "unsplit"),
        Godunov => (1, "godunov"),
        Strang => (2, "strang"),
    }
);

token_enum!(
    OutputFormat, "output format", {
        Ascii => (1, "ascii"),
        Netcdf => (2, "netcdf"),
        Binary => (3, "binary"),
    }
);

token_enum!(
    /// Location/meaning of one auxiliary variable.
    AuxType, "aux type", {
        Center => (1, "center"),
        Capacity => (2, "capacity"),
        XLeft => (3, "xleft"),
        YLeft => (4, "yleft"),
        ZLeft => (5, "zleft"),
    }
);
