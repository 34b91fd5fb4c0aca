use ngx_syntax::SyntaxKind::{self, *};
use text_size::TextSize;

use crate::{Analysis, FilePosition, pick_best_token};

impl Analysis {
    /// Start of the brace or parenthesis paired with the one at the cursor.
    pub fn matching_brace(&self, FilePosition { file, offset }: FilePosition) -> Option<TextSize> {
        let parse = file.parse(self.db());
        let tokens = parse.root().token_at_offset(offset);
        let brace = pick_best_token(tokens, |kind| usize::from(partner(kind).is_some()))?;
        let partner = partner(brace.kind())?;

        brace
            .parent()
            .child_tokens()
            .find(|token| token.kind() == partner)
            .map(|token| token.trimmed_range().start())
    }
}

fn partner(kind: SyntaxKind) -> Option<SyntaxKind> {
    let partner = match kind {
        LEFT_BRACE => RIGHT_BRACE,
        RIGHT_BRACE => LEFT_BRACE,
        LEFT_PAREN => RIGHT_PAREN,
        RIGHT_PAREN => LEFT_PAREN,
        _ => return None,
    };
    Some(partner)
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use crate::tests::extract_offset;
    use crate::{Analysis, FilePosition};

    #[track_caller]
    fn check(fixture: &str, expected: Option<&str>) {
        let analysis = Analysis::default();
        let (offset, text) = extract_offset(fixture);
        let file = analysis.add_file("nginx.conf", text.clone());

        let actual = analysis.matching_brace(FilePosition { file, offset });
        let expected = expected.map(|needle| {
            let pos = text.rfind(needle).unwrap();
            TextSize::from(pos as u32)
        });
        assert_eq!(actual, expected);
    }

    #[test]
    fn braces() {
        check("server $0{ listen 80; }", Some("}"));
        check("server { listen 80; $0}", Some("{"));
        check("http { server { a; }$0 }", Some("{ a;"));
    }

    #[test]
    fn parens() {
        check("if $0($a) { return 403; }", Some(")"));
        check("if ($a$0) { return 403; }", Some("("));
    }

    #[test]
    fn lua_braces() {
        check("content_by_lua_block $0{ local t = {} }", Some("}"));
    }

    #[test]
    fn unpaired() {
        check("server $0{ listen 80;", None);
        check("$0}", None);
        check("lis$0ten 80;", None);
    }
}
