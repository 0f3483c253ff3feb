//! Static symbol taxonomy browsed from the symbol-menu key.

use std::sync::OnceLock;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SymbolTableError {
    #[error("line {line}: more than one `=`")]
    Malformed { line: usize },
    #[error("line {line}: empty category title")]
    EmptyTitle { line: usize },
}

/// A category (with children) or a leaf symbol (without).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolNode {
    pub title: String,
    pub children: Option<Vec<SymbolNode>>,
}

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    (
        "Common Symbols",
        "，、。．？！；：‧‥﹐﹒˙·‘’“”〝〞‵′〃～＄％﹪＠＆＃＊・…—〜／＼＿―‖﹫﹟﹠﹡",
    ),
    (
        "Horizontal Brackets",
        "（）［］｛｝〈〉《》「」『』【】〔〕〖〗〘〙〚〛﹙﹚﹛﹜﹝﹞﹤﹥",
    ),
    ("Vertical Brackets", "︵︶﹁﹂︹︺︷︸︿﹀﹃﹄︽︾︻︼"),
    (
        "Alphabets",
        "αβγδεζηθικλμνξοπρστυφχψωΑΒΓΔΕΖΗΘΙΚΛΜΝΞΟΠΡΣΤΥΦΧΨΩ",
    ),
    ("Special Numbers", "ⅠⅡⅢⅣⅤⅥⅦⅧⅨⅩⅪⅫⅰⅱⅲⅳⅴⅵⅶⅷⅸⅹⅺⅻ〇〡〢〣〤〥〦〧〨〩"),
    (
        "Math Symbols",
        "﹢﹤﹥＋－＜＝＞±×÷√∞∟∠∩∪∫∮∴∵≒≠≡≦≧⊥⊿",
    ),
    ("Currency Units", "$€¥¢£₽₨₩฿₺₮₱₭₴₦₹₲₪₡₫៛₵₢₸₤₳₥₠₣₰₧₯￠￥￡＄﹩￦"),
    (
        "Special Symbols",
        "◎○●⊕⊙※△▲☆★◇◆□■▽▼№℡§〒♀♂¶©®™↑↓←→↖↗↙↘",
    ),
    ("Single Table Lines", "─│┌┐└┕┘├┤┬┴┼═╞╡╪╭╮╯╰▕"),
    ("Double Table Lines", "═║╒╓╔╕╖╗╘╙╚╛╜╝╞╟╠╡╢╣╤╥╦╧╨╩╪╫╬"),
    ("Filling Blocks", "＿ˍ▁▂▃▄▅▆▇█▏▎▍▌▋▊▉◢◣◥◤"),
    (
        "Phonabets",
        "ㄅㄆㄇㄈㄉㄊㄋㄌㄍㄎㄏㄐㄑㄒㄓㄔㄕㄖㄗㄘㄙㄚㄛㄜㄝㄞㄟㄠㄡㄢㄣㄤㄥㄦㄧㄨㄩ˙ˊˇˋ",
    ),
    ("Circled Numbers", "①②③④⑤⑥⑦⑧⑨⑩⑪⑫⑬⑭⑮⑯⑰⑱⑲⑳"),
];

impl SymbolNode {
    pub fn leaf(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            children: None,
        }
    }

    pub fn category(title: impl Into<String>, children: Vec<SymbolNode>) -> Self {
        Self {
            title: title.into(),
            children: Some(children),
        }
    }

    /// Category whose children are one leaf per character of `symbols`.
    pub fn from_symbols(title: impl Into<String>, symbols: &str) -> Self {
        Self::category(title, symbols.chars().map(|c| Self::leaf(c)).collect())
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Titles of the children, as offered in the candidate window.
    pub fn child_titles(&self) -> Vec<String> {
        self.children
            .iter()
            .flatten()
            .map(|c| c.title.clone())
            .collect()
    }

    pub fn child(&self, index: usize) -> Option<&SymbolNode> {
        self.children.as_ref()?.get(index)
    }

    /// Shared built-in root.
    pub fn default_root() -> &'static SymbolNode {
        static ROOT: OnceLock<SymbolNode> = OnceLock::new();
        ROOT.get_or_init(|| {
            let mut children = vec![Self::leaf("　"), Self::leaf("｀")];
            children.extend(
                DEFAULT_CATEGORIES
                    .iter()
                    .map(|(title, symbols)| Self::from_symbols(*title, symbols)),
            );
            Self::category("/", children)
        })
    }

    /// Parse a user table: `Category=symbols` lines, or a bare leaf per
    /// line. Yields the default root when the text has no entries.
    pub fn parse_user_table(text: &str) -> Result<SymbolNode, SymbolTableError> {
        let mut children = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('=').collect();
            match fields.as_slice() {
                [leaf] => children.push(Self::leaf(*leaf)),
                [title, _] if title.is_empty() => {
                    return Err(SymbolTableError::EmptyTitle { line: idx + 1 })
                }
                [title, symbols] => children.push(Self::from_symbols(*title, symbols)),
                _ => return Err(SymbolTableError::Malformed { line: idx + 1 }),
            }
        }
        if children.is_empty() {
            return Ok(Self::default_root().clone());
        }
        Ok(Self::category("/", children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_layout() {
        let root = SymbolNode::default_root();
        assert_eq!(root.title, "/");
        let titles = root.child_titles();
        assert_eq!(titles[0], "　");
        assert_eq!(titles[2], "Common Symbols");
        assert!(root.child(0).unwrap().is_leaf());
        let common = root.child(2).unwrap();
        assert_eq!(common.child(0).unwrap().title, "，");
        assert!(common.child(0).unwrap().is_leaf());
    }

    #[test]
    fn parse_user_table_lines() {
        let root = SymbolNode::parse_user_table("★\nArrows=←→\n\n").unwrap();
        assert_eq!(root.child_titles(), vec!["★", "Arrows"]);
        assert_eq!(root.child(1).unwrap().child_titles(), vec!["←", "→"]);
    }

    #[test]
    fn parse_user_table_empty_falls_back() {
        let root = SymbolNode::parse_user_table("\n").unwrap();
        assert_eq!(&root, SymbolNode::default_root());
    }

    #[test]
    fn parse_user_table_errors() {
        assert_eq!(
            SymbolNode::parse_user_table("a=b=c"),
            Err(SymbolTableError::Malformed { line: 1 })
        );
        assert_eq!(
            SymbolNode::parse_user_table("ok\n=xyz"),
            Err(SymbolTableError::EmptyTitle { line: 2 })
        );
    }
}
