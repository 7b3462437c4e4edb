//! Three-letter payment method codes.
//!
//! See <https://docs.datatrans.ch/docs/payment-methods>.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::UnknownValue;

macro_rules! payment_methods {
    ($($(#[$meta:meta])* $variant:ident => $code:literal,)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum PaymentMethod {
            $(
                $(#[$meta])*
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl PaymentMethod {
            pub const ALL: &'static [PaymentMethod] = &[$(PaymentMethod::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(PaymentMethod::$variant => $code,)+
                }
            }
        }

        impl FromStr for PaymentMethod {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(PaymentMethod::$variant),)+
                    _ => Err(UnknownValue {
                        kind: "payment method",
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

payment_methods! {
    Acc => "ACC",
    Alp => "ALP",
    /// Apple Pay
    Apl => "APL",
    /// American Express
    Amx => "AMX",
    Azp => "AZP",
    Bac => "BAC",
    Bon => "BON",
    Cbl => "CBL",
    Cfy => "CFY",
    Csy => "CSY",
    Cup => "CUP",
    Dea => "DEA",
    Din => "DIN",
    Dii => "DII",
    Dib => "DIB",
    Dis => "DIS",
    Dnk => "DNK",
    Eca => "ECA",
    Elv => "ELV",
    Eps => "EPS",
    Esy => "ESY",
    Gft => "GFT",
    Gpa => "GPA",
    Hpc => "HPC",
    Int => "INT",
    Jcb => "JCB",
    Jel => "JEL",
    Kln => "KLN",
    Mau => "MAU",
    Mdp => "MDP",
    Mfa => "MFA",
    Mfx => "MFX",
    Mpx => "MPX",
    Myo => "MYO",
    Pap => "PAP",
    /// Google Pay
    Pay => "PAY",
    Pef => "PEF",
    Pfc => "PFC",
    Psc => "PSC",
    Rek => "REK",
    Sam => "SAM",
    Swb => "SWB",
    Scx => "SCX",
    Swp => "SWP",
    /// Twint
    Twi => "TWI",
    Uap => "UAP",
    Vis => "VIS",
    Wec => "WEC",
    Swh => "SWH",
    Vps => "VPS",
    Mbp => "MBP",
    Gep => "GEP",
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
