use regex::Regex;
use std::sync::LazyLock;

/// 卡片編號，例如 OP02-068、ST10-001、EB01-012
static CARD_CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:OP|ST|EB)[0-9]{2}-[0-9]{3}").expect("card code pattern is valid")
});

/// 從異畫圖檔名拆出的各種名稱
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardNameBases {
    pub full_stem: String,
    pub card_code: Option<String>,
    pub before_parenthesis: Option<String>,
}

impl CardNameBases {
    /// "OP02-068(PRB02)" -> full stem, "OP02-068", "OP02-068"
    /// "OP09-051Manga alt" -> full stem, "OP09-051", None
    pub fn from_stem(stem: &str) -> Self {
        let card_code = CARD_CODE_PATTERN
            .find(stem)
            .map(|m| m.as_str().to_uppercase());

        let before_parenthesis = stem
            .split_once('(')
            .map(|(head, _)| head.trim_end().to_string());

        Self {
            full_stem: stem.to_string(),
            card_code,
            before_parenthesis,
        }
    }

    /// 依優先序回傳不重複的候選名稱，第一個永遠是完整主幹
    pub fn unique_bases(&self) -> Vec<String> {
        let mut bases = vec![self.full_stem.clone()];

        for base in [&self.card_code, &self.before_parenthesis]
            .into_iter()
            .flatten()
        {
            // 括號在開頭時前綴是空字串，不能當成檔名
            if !base.is_empty() && !bases.contains(base) {
                bases.push(base.clone());
            }
        }

        bases
    }
}

pub fn candidate_base_names(stem: &str) -> Vec<String> {
    CardNameBases::from_stem(stem).unique_bases()
}
