use crate::core::Incubator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult {
    pub report: IncubatorReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncubatorReport {
    pub number_of_eggs: usize,
    pub sequence: String,
    pub rotation_amount: f64,
    pub rotations: Vec<EggRotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EggRotation {
    pub egg: u32,
    pub was_rotated: bool,
}

impl From<&Incubator> for IncubatorReport {
    fn from(incubator: &Incubator) -> Self {
        Self {
            number_of_eggs: incubator.number_of_eggs(),
            sequence: incubator
                .sequence()
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(" "),
            rotation_amount: incubator.rotation(),
            rotations: incubator
                .eggs()
                .iter()
                .map(|egg| EggRotation {
                    egg: egg.id,
                    was_rotated: egg.rotated,
                })
                .collect(),
        }
    }
}

impl From<&Incubator> for ApiResult {
    fn from(incubator: &Incubator) -> Self {
        Self {
            report: IncubatorReport::from(incubator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scheduler::RotationScheduler;
    use serde_json::json;

    #[test]
    fn test_report_shape() {
        let incubator = Incubator::new(3, vec![2, 0], 0.5).unwrap();
        let incubator = RotationScheduler::default().next_state(&incubator);

        let result = ApiResult::from(&incubator);

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "report": {
                    "number_of_eggs": 3,
                    "sequence": "2 0",
                    "rotation_amount": 0.5,
                    "rotations": [
                        {"egg": 0, "was_rotated": false},
                        {"egg": 1, "was_rotated": false},
                        {"egg": 2, "was_rotated": true}
                    ]
                }
            })
        );
    }
}
