//! Japanese narrative templates for derived rows
//!
//! Text fields of the derived tables are templated from the pooled numeric
//! results plus the issue's bilingual names. Selection is table-driven by
//! category, risk type, or projection horizon.

use ortho_domain::{EffectCategory, EffectDirection, RiskType};

/// Narrative for an age-risk row.
pub fn risk_description(risk_type: RiskType, threshold: u8, value: f64) -> String {
    match risk_type {
        RiskType::ToothLoss => format!(
            "{}歳までに矯正を行わないと、将来的に{:.1}%の歯を喪失するリスクがあります。",
            threshold, value
        ),
        RiskType::Periodontal => format!("歯周病リスクが{:.1}%上昇します。", value),
        RiskType::Tmj => format!("顎関節症リスクが{:.1}倍になります。", value),
        RiskType::Mastication => format!("咀嚼機能が{:.1}%低下します。", value),
        RiskType::Speech => format!("発音障害リスクが{:.1}倍になります。", value),
    }
}

/// Narrative for a treatment-effect row.
///
/// `decrease` reads as the benefit of treating, `increase` as the cost of
/// leaving the issue untreated.
pub fn effect_description(
    issue_name_ja: &str,
    category: EffectCategory,
    value: f64,
    direction: EffectDirection,
) -> String {
    let rounded = value.round();
    match (category, direction) {
        (EffectCategory::CariesRisk, EffectDirection::Decrease) => {
            format!("{}を矯正することで、齲蝕リスクが{}%減少します。", issue_name_ja, rounded)
        }
        (EffectCategory::CariesRisk, EffectDirection::Increase) => {
            format!("{}を放置すると、齲蝕リスクが{}%増加します。", issue_name_ja, rounded)
        }
        (EffectCategory::PeriodontalRisk, EffectDirection::Decrease) => {
            format!("{}を矯正することで、歯周病リスクが{}%減少します。", issue_name_ja, rounded)
        }
        (EffectCategory::PeriodontalRisk, EffectDirection::Increase) => {
            format!("{}を放置すると、歯周病リスクが{}%増加します。", issue_name_ja, rounded)
        }
        (EffectCategory::TmjRisk, EffectDirection::Decrease) => {
            format!("{}を矯正することで、顎関節症リスクが{}%減少します。", issue_name_ja, rounded)
        }
        (EffectCategory::TmjRisk, EffectDirection::Increase) => {
            format!("{}を放置すると、顎関節症リスクが{:.1}倍になります。", issue_name_ja, rounded / 20.0)
        }
        (EffectCategory::Mastication, EffectDirection::Decrease) => {
            format!("{}を矯正することで、咀嚼効率が{}%向上します。", issue_name_ja, rounded)
        }
        (EffectCategory::Mastication, EffectDirection::Increase) => {
            format!("{}を放置すると、咀嚼効率が{}%低下します。", issue_name_ja, rounded)
        }
        (EffectCategory::Aesthetic, EffectDirection::Decrease) => {
            format!("{}を矯正することで、審美性が大幅に向上します。", issue_name_ja)
        }
        (EffectCategory::Aesthetic, EffectDirection::Increase) => {
            format!("{}を放置すると、審美性に問題が生じます。", issue_name_ja)
        }
        (EffectCategory::Pronunciation, EffectDirection::Decrease) => {
            format!("{}を矯正することで、発音障害が{}%改善します。", issue_name_ja, rounded)
        }
        (EffectCategory::Pronunciation, EffectDirection::Increase) => {
            format!("{}を放置すると、発音障害リスクが{:.1}倍になります。", issue_name_ja, rounded / 25.0)
        }
        (EffectCategory::TraumaRisk, EffectDirection::Decrease) => {
            format!("{}を矯正することで、外傷リスクが{}%減少します。", issue_name_ja, rounded)
        }
        (EffectCategory::TraumaRisk, EffectDirection::Increase) => {
            format!("{}を放置すると、外傷リスクが{:.1}倍になります。", issue_name_ja, rounded / 20.0)
        }
        (EffectCategory::Other, EffectDirection::Decrease) => {
            format!("{}を矯正することで、口腔健康リスクが{}%減少します。", issue_name_ja, rounded)
        }
        (EffectCategory::Other, EffectDirection::Increase) => {
            format!("{}を放置すると、口腔健康リスクが{}%増加します。", issue_name_ja, rounded)
        }
    }
}

/// Narrative for the with-treatment side of a future scenario.
pub fn with_treatment_scenario(years: u8, age_min: u8) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push("歯並びが改善され、清掃性が向上".to_string());

    let risk_reduction = 40 - (years as i64 / 2).min(10);
    parts.push(format!("齲蝕・歯周病リスクが{}%減少", risk_reduction));

    parts.push("審美性向上により社会的自信が増加".to_string());

    if age_min <= 18 {
        let gain = 25 + (years as i64 / 2).min(10);
        parts.push(format!("咀嚼効率が{}%向上し、消化不良の問題が改善", gain));
    } else {
        parts.push("咀嚼効率が25%向上し、消化不良の問題が改善".to_string());
    }

    if years >= 10 {
        let loss_reduction = if age_min <= 18 {
            65
        } else if age_min <= 40 {
            50
        } else {
            35
        };
        parts.push(format!("歯の喪失リスクが{}%減少", loss_reduction));
        parts.push("顎関節症の発症を予防".to_string());
        parts.push("咀嚼効率の維持により栄養状態が良好".to_string());
        parts.push("歯並びの安定により新たな歯科問題の発生を抑制".to_string());
    }

    if years >= 20 {
        if age_min <= 18 {
            parts.push("健康な歯列の維持により高齢になっても80%以上の歯を保持".to_string());
        } else if age_min <= 40 {
            parts.push("健康な歯列の維持により高齢になっても70%以上の歯を保持".to_string());
        } else {
            parts.push("健康な歯列の維持により残存歯の喪失を最小限に抑制".to_string());
        }
        parts.push("入れ歯やインプラントの必要性が大幅に減少".to_string());
        parts.push("良好な咀嚼機能により食事の質と栄養状態を維持".to_string());
        parts.push("会話の明瞭さを保ち、社会的交流の質を維持".to_string());
    }

    format!("{}。", parts.join("。"))
}

/// Narrative for the without-treatment side of a future scenario.
pub fn without_treatment_scenario(years: u8, age_min: u8) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push("歯列不正が継続し、清掃困難な部位での齲蝕・歯周病リスクが上昇".to_string());

    let risk_increase = if years <= 5 {
        35
    } else if years <= 10 {
        45
    } else {
        60
    };
    parts.push(format!("齲蝕・歯周病リスクが{}%上昇", risk_increase));

    let efficiency_loss = if years <= 5 {
        15
    } else if years <= 10 {
        25
    } else {
        40
    };
    parts.push(format!("咀嚼効率が約{}%低下", efficiency_loss));

    if age_min <= 18 {
        parts.push("若年期の問題が成長と共に悪化".to_string());
    } else if age_min <= 40 {
        parts.push("成人期の問題が蓄積".to_string());
    } else {
        parts.push("既存の問題が加齢と共に悪化".to_string());
    }

    parts.push("消化不良や栄養吸収の問題が発生する可能性".to_string());

    if years >= 10 {
        let tooth_loss = if age_min <= 18 {
            "1〜3本"
        } else if age_min <= 40 {
            "2〜5本"
        } else {
            "3〜7本"
        };
        parts.push(format!("歯周病の進行により、{}の歯を喪失するリスクが高まる", tooth_loss));
        parts.push("顎関節症を発症するリスクが2.5倍に".to_string());
        parts.push("咀嚼効率がさらに低下し、食事の選択肢が制限される可能性".to_string());
    }

    if years >= 20 {
        let severe_loss = if age_min <= 18 {
            "5〜8本"
        } else if age_min <= 40 {
            "8〜12本"
        } else {
            "10〜15本"
        };
        parts.push(format!("重度の歯周病により、{}以上の歯を喪失する可能性が高い", severe_loss));
        parts.push("多数の歯の欠損により入れ歯やインプラント治療が必要になる可能性が70%以上".to_string());
        parts.push("咀嚼機能が50%以上低下し、栄養不足のリスクが増加".to_string());
        parts.push("発音障害により社会的コミュニケーションに支障をきたす可能性".to_string());
    }

    format!("{}。", parts.join("。"))
}
