//! detection condition 식 파서
//!
//! `selection and not filter`, `1 of selection_*`, `all of them` 형태의
//! 조건식을 AST로 파싱합니다. 우선순위는 `not` > `and` > `or`이며
//! 괄호로 묶을 수 있습니다.
//!
//! 집계 표현식(`selection | count(...) > 5`)은 이 백엔드가 표현할 수
//! 없으므로 파싱 단계에서 거부합니다.

/// 조건식 AST
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionExpr {
    /// selection 이름 참조
    Selection(String),
    /// 부정
    Not(Box<ConditionExpr>),
    /// AND 결합 (2개 이상)
    And(Vec<ConditionExpr>),
    /// OR 결합 (2개 이상)
    Or(Vec<ConditionExpr>),
    /// `all of <pattern>` — 매칭되는 selection 전부 AND
    OfAll(OfPattern),
    /// `1 of <pattern>` / `any of <pattern>` — 매칭되는 selection OR
    OfAny(OfPattern),
}

/// `of` 수량사의 대상 패턴
#[derive(Debug, Clone, PartialEq)]
pub enum OfPattern {
    /// 모든 selection (`them`)
    Them,
    /// 이름 글롭 (`selection_*` 등, `*` 와일드카드만 지원)
    Glob(String),
}

/// 조건식을 파싱합니다.
///
/// 에러는 사유 문자열로 반환되며, 호출자가 규칙 컨텍스트를 붙여
/// [`SigmaError::Condition`](crate::error::SigmaError)으로 감쌉니다.
pub fn parse_condition(input: &str) -> Result<ConditionExpr, String> {
    if input.contains('|') {
        return Err("aggregation expressions are not supported".to_owned());
    }

    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("empty condition".to_owned());
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!(
            "unexpected trailing token '{}'",
            parser.tokens[parser.pos]
        ));
    }
    Ok(expr)
}

/// `*` 와일드카드 글롭 매칭
///
/// selection 이름 비교는 대소문자를 구분합니다.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == name;
    }

    let segments: Vec<&str> = pattern.split('*').collect();
    let last_index = segments.len() - 1;

    let mut remainder = match name.strip_prefix(segments[0]) {
        Some(rest) => rest,
        None => return false,
    };

    for segment in &segments[1..last_index] {
        if segment.is_empty() {
            continue;
        }
        match remainder.find(segment) {
            Some(found) => remainder = &remainder[found + segment.len()..],
            None => return false,
        }
    }

    let last = segments[last_index];
    last.is_empty() || remainder.ends_with(last)
}

fn tokenize(input: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in input.chars() {
        match ch {
            '(' | ')' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<String>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn next(&mut self) -> Option<&str> {
        let token = self.tokens.get(self.pos).map(String::as_str);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.eq_ignore_ascii_case(keyword))
    }

    fn parse_or(&mut self) -> Result<ConditionExpr, String> {
        let mut terms = vec![self.parse_and()?];
        while self.peek_keyword("or") {
            self.pos += 1;
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            ConditionExpr::Or(terms)
        })
    }

    fn parse_and(&mut self) -> Result<ConditionExpr, String> {
        let mut terms = vec![self.parse_unary()?];
        while self.peek_keyword("and") {
            self.pos += 1;
            terms.push(self.parse_unary()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            ConditionExpr::And(terms)
        })
    }

    fn parse_unary(&mut self) -> Result<ConditionExpr, String> {
        if self.peek_keyword("not") {
            self.pos += 1;
            let inner = self.parse_unary()?;
            return Ok(ConditionExpr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ConditionExpr, String> {
        let Some(token) = self.next().map(str::to_owned) else {
            return Err("unexpected end of condition".to_owned());
        };

        match token.as_str() {
            "(" => {
                let inner = self.parse_or()?;
                match self.next() {
                    Some(")") => Ok(inner),
                    _ => Err("missing closing parenthesis".to_owned()),
                }
            }
            ")" => Err("unexpected ')'".to_owned()),
            t if t.eq_ignore_ascii_case("all") => {
                self.expect_of()?;
                Ok(ConditionExpr::OfAll(self.parse_of_pattern()?))
            }
            t if t.eq_ignore_ascii_case("any") || t == "1" => {
                self.expect_of()?;
                Ok(ConditionExpr::OfAny(self.parse_of_pattern()?))
            }
            t if t.chars().all(|c| c.is_ascii_digit()) => {
                Err(format!("unsupported quantifier '{t} of'"))
            }
            t if is_keyword(t) => Err(format!("unexpected keyword '{t}'")),
            _ => Ok(ConditionExpr::Selection(token)),
        }
    }

    fn expect_of(&mut self) -> Result<(), String> {
        match self.next() {
            Some(t) if t.eq_ignore_ascii_case("of") => Ok(()),
            Some(t) => Err(format!("expected 'of', found '{t}'")),
            None => Err("expected 'of' after quantifier".to_owned()),
        }
    }

    fn parse_of_pattern(&mut self) -> Result<OfPattern, String> {
        match self.next() {
            Some(t) if t.eq_ignore_ascii_case("them") => Ok(OfPattern::Them),
            Some("(") | Some(")") => Err("expected selection pattern after 'of'".to_owned()),
            Some(t) if is_keyword(t) => Err(format!("expected selection pattern, found '{t}'")),
            Some(t) => Ok(OfPattern::Glob(t.to_owned())),
            None => Err("expected selection pattern after 'of'".to_owned()),
        }
    }
}

fn is_keyword(token: &str) -> bool {
    ["and", "or", "not", "of", "them", "all", "any"]
        .iter()
        .any(|k| token.eq_ignore_ascii_case(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_selection() {
        let expr = parse_condition("selection").unwrap();
        assert_eq!(expr, ConditionExpr::Selection("selection".to_owned()));
    }

    #[test]
    fn parse_and_not() {
        let expr = parse_condition("selection and not filter").unwrap();
        assert_eq!(
            expr,
            ConditionExpr::And(vec![
                ConditionExpr::Selection("selection".to_owned()),
                ConditionExpr::Not(Box::new(ConditionExpr::Selection("filter".to_owned()))),
            ])
        );
    }

    #[test]
    fn parse_precedence_or_binds_loosest() {
        let expr = parse_condition("a and b or c").unwrap();
        match expr {
            ConditionExpr::Or(terms) => {
                assert_eq!(terms.len(), 2);
                assert!(matches!(terms[0], ConditionExpr::And(_)));
                assert_eq!(terms[1], ConditionExpr::Selection("c".to_owned()));
            }
            other => panic!("expected Or at top level, got {other:?}"),
        }
    }

    #[test]
    fn parse_parentheses_override_precedence() {
        let expr = parse_condition("a and (b or c)").unwrap();
        match expr {
            ConditionExpr::And(terms) => {
                assert!(matches!(terms[1], ConditionExpr::Or(_)));
            }
            other => panic!("expected And at top level, got {other:?}"),
        }
    }

    #[test]
    fn parse_of_them_variants() {
        assert_eq!(
            parse_condition("all of them").unwrap(),
            ConditionExpr::OfAll(OfPattern::Them)
        );
        assert_eq!(
            parse_condition("1 of them").unwrap(),
            ConditionExpr::OfAny(OfPattern::Them)
        );
        assert_eq!(
            parse_condition("any of selection_*").unwrap(),
            ConditionExpr::OfAny(OfPattern::Glob("selection_*".to_owned()))
        );
    }

    #[test]
    fn parse_rejects_counted_quantifier() {
        assert!(parse_condition("2 of them").is_err());
    }

    #[test]
    fn parse_rejects_aggregation() {
        let err = parse_condition("selection | count() > 5").unwrap_err();
        assert!(err.contains("aggregation"));
    }

    #[test]
    fn parse_rejects_unbalanced_parens() {
        assert!(parse_condition("(a and b").is_err());
        assert!(parse_condition("a and b)").is_err());
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert!(parse_condition("   ").is_err());
    }

    #[test]
    fn parse_is_deterministic() {
        let first = parse_condition("a and not (b or c)").unwrap();
        let second = parse_condition("a and not (b or c)").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn glob_match_exact_and_wildcard() {
        assert!(glob_match("selection", "selection"));
        assert!(!glob_match("selection", "selection_a"));
        assert!(glob_match("selection_*", "selection_a"));
        assert!(glob_match("*_filter", "main_filter"));
        assert!(glob_match("sel*ion", "selection"));
        assert!(!glob_match("sel*ion", "filter"));
    }
}
