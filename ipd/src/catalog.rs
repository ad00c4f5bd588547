//! Strategy identities with their construction arguments
//!
//! A `StrategySpec` is plain data: it can be cloned into many probe variants,
//! written to configs and rebuilt into a runnable strategy at any time. Transformed
//! strategies are rebuilt from the same spec, so construction arguments survive
//! transformation.

use crate::strategies::*;
use crate::{EngineError, ParseStrategyError, Strategy, check_probability};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StrategySpec {
    Cooperator,
    Defector,
    TitForTat,
    TitFor2Tats,
    TwoTitsForTat,
    AntiTitForTat,
    Bully,
    WinStayLoseShift,
    Grudger,
    Random(f64),
    Cycler(String),
    GoByMajority(usize),
    MemoryOne([f64; 4]),
}

impl StrategySpec {
    /// The argument-free strategies, in a fixed order
    pub fn basic() -> Vec<StrategySpec> {
        vec![
            StrategySpec::Cooperator,
            StrategySpec::Defector,
            StrategySpec::TitForTat,
            StrategySpec::TitFor2Tats,
            StrategySpec::TwoTitsForTat,
            StrategySpec::AntiTitForTat,
            StrategySpec::Bully,
            StrategySpec::WinStayLoseShift,
            StrategySpec::Grudger,
        ]
    }

    /// Build a runnable strategy, validating the construction arguments
    pub fn build(&self) -> Result<Box<dyn Strategy>, EngineError> {
        Ok(match self {
            StrategySpec::Cooperator => Box::new(Cooperator),
            StrategySpec::Defector => Box::new(Defector),
            StrategySpec::TitForTat => Box::new(TitForTat),
            StrategySpec::TitFor2Tats => Box::new(TitFor2Tats),
            StrategySpec::TwoTitsForTat => Box::new(TwoTitsForTat),
            StrategySpec::AntiTitForTat => Box::new(AntiTitForTat),
            StrategySpec::Bully => Box::new(Bully),
            StrategySpec::WinStayLoseShift => Box::new(WinStayLoseShift),
            StrategySpec::Grudger => Box::new(Grudger),
            StrategySpec::Random(p) => Box::new(Random::new(*p)?),
            StrategySpec::Cycler(pattern) => Box::new(Cycler::new(pattern).ok_or_else(|| {
                EngineError::InvalidStrategy(format!("cycler pattern `{}`", pattern))
            })?),
            StrategySpec::GoByMajority(memory) => Box::new(GoByMajority::new(*memory)),
            StrategySpec::MemoryOne(v) => Box::new(MemoryOne::new(*v)?),
        })
    }

    /// Display name, as it appears in summary tables
    pub fn name(&self) -> String {
        match self {
            StrategySpec::Cooperator => "Cooperator".to_string(),
            StrategySpec::Defector => "Defector".to_string(),
            StrategySpec::TitForTat => "Tit For Tat".to_string(),
            StrategySpec::TitFor2Tats => "Tit For 2 Tats".to_string(),
            StrategySpec::TwoTitsForTat => "Two Tits For Tat".to_string(),
            StrategySpec::AntiTitForTat => "Anti Tit For Tat".to_string(),
            StrategySpec::Bully => "Bully".to_string(),
            StrategySpec::WinStayLoseShift => "Win-Stay Lose-Shift".to_string(),
            StrategySpec::Grudger => "Grudger".to_string(),
            StrategySpec::Random(p) => format!("Random: {}", p),
            StrategySpec::Cycler(pattern) => format!("Cycler {}", pattern.to_uppercase()),
            StrategySpec::GoByMajority(0) => "Go By Majority".to_string(),
            StrategySpec::GoByMajority(memory) => format!("Go By Majority: {}", memory),
            StrategySpec::MemoryOne(_) => "Generic Memory One Player".to_string(),
        }
    }
}

impl fmt::Display for StrategySpec {
    /// Writes the textual key that `FromStr` accepts
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategySpec::Cooperator => write!(f, "cooperator"),
            StrategySpec::Defector => write!(f, "defector"),
            StrategySpec::TitForTat => write!(f, "tit_for_tat"),
            StrategySpec::TitFor2Tats => write!(f, "tit_for_2_tats"),
            StrategySpec::TwoTitsForTat => write!(f, "two_tits_for_tat"),
            StrategySpec::AntiTitForTat => write!(f, "anti_tit_for_tat"),
            StrategySpec::Bully => write!(f, "bully"),
            StrategySpec::WinStayLoseShift => write!(f, "win_stay_lose_shift"),
            StrategySpec::Grudger => write!(f, "grudger"),
            StrategySpec::Random(p) => write!(f, "random:{}", p),
            StrategySpec::Cycler(pattern) => write!(f, "cycler:{}", pattern),
            StrategySpec::GoByMajority(memory) => write!(f, "go_by_majority:{}", memory),
            StrategySpec::MemoryOne([a, b, c, d]) => {
                write!(f, "memory_one:{},{},{},{}", a, b, c, d)
            }
        }
    }
}

impl FromStr for StrategySpec {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (key, arg) = match s.split_once(':') {
            Some((key, arg)) => (key.trim(), Some(arg.trim())),
            None => (s, None),
        };
        let invalid = |arg: &str| ParseStrategyError::InvalidArgument {
            key: key.to_string(),
            arg: arg.to_string(),
        };
        let required = || arg.ok_or_else(|| ParseStrategyError::MissingArgument(key.to_string()));

        match key {
            "cooperator" => Ok(StrategySpec::Cooperator),
            "defector" => Ok(StrategySpec::Defector),
            "tit_for_tat" => Ok(StrategySpec::TitForTat),
            "tit_for_2_tats" => Ok(StrategySpec::TitFor2Tats),
            "two_tits_for_tat" => Ok(StrategySpec::TwoTitsForTat),
            "anti_tit_for_tat" => Ok(StrategySpec::AntiTitForTat),
            "bully" => Ok(StrategySpec::Bully),
            "win_stay_lose_shift" => Ok(StrategySpec::WinStayLoseShift),
            "grudger" => Ok(StrategySpec::Grudger),
            "random" => {
                let arg = arg.unwrap_or("0.5");
                let p = arg.parse::<f64>().map_err(|_| invalid(arg))?;
                check_probability(p).map_err(|_| invalid(arg))?;
                Ok(StrategySpec::Random(p))
            }
            "cycler" => {
                let arg = required()?;
                if Cycler::new(arg).is_none() {
                    return Err(invalid(arg));
                }
                Ok(StrategySpec::Cycler(arg.to_uppercase()))
            }
            "go_by_majority" => {
                let memory = match arg {
                    Some(arg) => arg.parse::<usize>().map_err(|_| invalid(arg))?,
                    None => 0,
                };
                Ok(StrategySpec::GoByMajority(memory))
            }
            "memory_one" => {
                let arg = required()?;
                let values: Vec<f64> = arg
                    .split(',')
                    .map(|v| v.trim().parse::<f64>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| invalid(arg))?;
                let four_vector: [f64; 4] = values.try_into().map_err(|_| invalid(arg))?;
                if four_vector.iter().any(|&p| check_probability(p).is_err()) {
                    return Err(invalid(arg));
                }
                Ok(StrategySpec::MemoryOne(four_vector))
            }
            other => Err(ParseStrategyError::UnknownKey(other.to_string())),
        }
    }
}

impl TryFrom<String> for StrategySpec {
    type Error = ParseStrategyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StrategySpec> for String {
    fn from(spec: StrategySpec) -> String {
        spec.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip_through_display() {
        let specs = vec![
            StrategySpec::TitForTat,
            StrategySpec::Random(0.25),
            StrategySpec::Cycler("CD".to_string()),
            StrategySpec::GoByMajority(75),
            StrategySpec::MemoryOne([1.0, 0.5, 0.0, 0.25]),
        ];
        for spec in specs {
            assert_eq!(spec.to_string().parse::<StrategySpec>(), Ok(spec));
        }
    }

    #[test]
    fn test_names_match_built_strategies() {
        let mut specs = StrategySpec::basic();
        specs.push(StrategySpec::Random(0.5));
        specs.push(StrategySpec::Cycler("CD".to_string()));
        specs.push(StrategySpec::GoByMajority(75));
        specs.push(StrategySpec::GoByMajority(0));
        specs.push(StrategySpec::MemoryOne([1.0, 1.0, 0.0, 0.0]));
        for spec in specs {
            assert_eq!(spec.build().unwrap().name(), spec.name());
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "nice_guy".parse::<StrategySpec>(),
            Err(ParseStrategyError::UnknownKey("nice_guy".to_string()))
        );
        assert_eq!(
            "memory_one".parse::<StrategySpec>(),
            Err(ParseStrategyError::MissingArgument("memory_one".to_string()))
        );
        assert!("memory_one:1,1,0".parse::<StrategySpec>().is_err());
        assert!("memory_one:1,1,0,2".parse::<StrategySpec>().is_err());
        assert!("cycler:CQ".parse::<StrategySpec>().is_err());
        assert!("random:abc".parse::<StrategySpec>().is_err());
    }

    #[test]
    fn test_defaults_for_optional_arguments() {
        assert_eq!("random".parse::<StrategySpec>(), Ok(StrategySpec::Random(0.5)));
        assert_eq!(
            "go_by_majority".parse::<StrategySpec>(),
            Ok(StrategySpec::GoByMajority(0))
        );
        assert_eq!(
            "cycler:cd".parse::<StrategySpec>(),
            Ok(StrategySpec::Cycler("CD".to_string()))
        );
    }

    #[test]
    fn test_build_rejects_bad_cycler_pattern() {
        // the variant can be constructed directly, bypassing parse
        for pattern in ["CQ", ""] {
            let spec = StrategySpec::Cycler(pattern.to_string());
            assert!(matches!(spec.build(), Err(EngineError::InvalidStrategy(_))));
        }
        assert!(StrategySpec::Cycler("CCD".to_string()).build().is_ok());
    }

    #[test]
    fn test_serde_uses_keys() {
        #[derive(Deserialize, Serialize)]
        struct Holder {
            strategy: StrategySpec,
        }

        let data = "strategy\n\"memory_one:1,0,1,0\"\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let holder: Holder = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(holder.strategy, StrategySpec::MemoryOne([1.0, 0.0, 1.0, 0.0]));

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&holder).unwrap();
        let written = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(written, data);
    }
}
