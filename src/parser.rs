use crate::{
    error::{Error, Result},
    select::{ColumnRef, JoinClause, SelectStmt, Value, ValueTest},
    table::Datum,
    token::{Keyword, Token, TokenKind, tokenize},
};

/// Parses one query. Enforces structure only; table and column existence is
/// checked at execution time.
pub fn parse_query(src: &str) -> Result<SelectStmt> {
    let tokens = tokenize(src)?;
    Parser { tokens, pos: 0 }.query()
}

/// Recursive descent over the token stream, one routine per grammar rule,
/// one token of lookahead.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Consumes the current token. Never moves past the end-of-input token.
    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        self.eat(TokenKind::Keyword(kw))
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<()> {
        if self.eat_keyword(kw) {
            Ok(())
        } else {
            Err(self.expected(kw.as_str()))
        }
    }

    fn expected(&self, expected: &str) -> Error {
        let token = self.peek();
        Error::Syntax {
            expected: expected.to_string(),
            found: token.kind.to_string(),
            at: token.at,
        }
    }

    fn ident(&mut self, expected: &str) -> Result<String> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.bump();
            Ok(name)
        } else {
            Err(self.expected(expected))
        }
    }

    /// query = SELECT columns FROM table {JOIN table ON value-test}
    ///         [WHERE value-test] end-of-input
    fn query(mut self) -> Result<SelectStmt> {
        self.expect_keyword(Keyword::Select)?;
        let mut cols = vec![self.column_ref()?];
        while self.eat(TokenKind::Comma) {
            cols.push(self.column_ref()?);
        }

        self.expect_keyword(Keyword::From)?;
        let table = self.ident("table name")?;

        let mut joins = Vec::new();
        while self.eat_keyword(Keyword::Join) {
            let table = self.ident("table name")?;
            self.expect_keyword(Keyword::On)?;
            let on = self.value_test()?;
            joins.push(JoinClause { table, on });
        }

        let condition = if self.eat_keyword(Keyword::Where) {
            Some(self.value_test()?)
        } else {
            None
        };

        if self.peek().kind != TokenKind::Eof {
            return Err(self.expected("end of query"));
        }

        Ok(SelectStmt {
            cols,
            table,
            joins,
            condition,
        })
    }

    /// column-id = table-name "." column-name
    fn column_ref(&mut self) -> Result<ColumnRef> {
        let table = self.ident("column reference")?;
        if !self.eat(TokenKind::Dot) {
            return Err(self.expected("'.'"));
        }
        let column = self.ident("column name")?;
        Ok(ColumnRef { table, column })
    }

    /// value = column-id | number | string
    fn value(&mut self) -> Result<Value> {
        match &self.peek().kind {
            TokenKind::Number(n) => {
                let n = *n;
                self.bump();
                Ok(Value::Literal(Datum::Number(n)))
            }
            TokenKind::Str(s) => {
                let s = s.clone();
                self.bump();
                Ok(Value::Literal(Datum::Str(s)))
            }
            TokenKind::Ident(_) => Ok(Value::Column(self.column_ref()?)),
            _ => Err(self.expected("value")),
        }
    }

    /// value-test = value comparison value
    fn value_test(&mut self) -> Result<ValueTest> {
        let left = self.value()?;
        let cmp = match self.peek().kind {
            TokenKind::Cmp(cmp) => {
                self.bump();
                cmp
            }
            _ => return Err(self.expected("comparison operator")),
        };
        let right = self.value()?;
        Ok(ValueTest { left, cmp, right })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::select::Cmp;

    fn col(table: &str, column: &str) -> ColumnRef {
        ColumnRef {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    #[test]
    fn test_select() {
        let src = "SELECT t1.a, t2.b FROM t1";
        assert_eq!(
            parse_query(src).unwrap(),
            SelectStmt {
                cols: vec![col("t1", "a"), col("t2", "b")],
                table: "t1".to_string(),
                joins: vec![],
                condition: None,
            }
        );
    }

    #[test]
    fn test_select_list_length() {
        let src = "SELECT a.x, a.y, a.z, b.w FROM a";
        assert_eq!(parse_query(src).unwrap().cols.len(), 4);
    }

    #[test]
    fn test_select_join_where() {
        let src = "SELECT Employees.name, Departments.name \
                   FROM Employees \
                   JOIN Departments ON Employees.dept_id = Departments.id \
                   WHERE Employees.id > 1";
        assert_eq!(
            parse_query(src).unwrap(),
            SelectStmt {
                cols: vec![col("Employees", "name"), col("Departments", "name")],
                table: "Employees".to_string(),
                joins: vec![JoinClause {
                    table: "Departments".to_string(),
                    on: ValueTest {
                        left: Value::Column(col("Employees", "dept_id")),
                        cmp: Cmp::Eq,
                        right: Value::Column(col("Departments", "id")),
                    },
                }],
                condition: Some(ValueTest {
                    left: Value::Column(col("Employees", "id")),
                    cmp: Cmp::Gt,
                    right: Value::Literal(Datum::Number(1)),
                }),
            }
        );
    }

    #[test]
    fn test_chained_joins_in_source_order() {
        let src = "SELECT a.x FROM a \
                   JOIN b ON a.x = b.x \
                   JOIN c ON b.y = c.y";
        let stmt = parse_query(src).unwrap();
        let joined: Vec<&str> = stmt.joins.iter().map(|j| j.table.as_str()).collect();
        assert_eq!(joined, vec!["b", "c"]);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let src = "select x.y from x where x.y = 'z'";
        let stmt = parse_query(src).unwrap();
        assert_eq!(stmt.table, "x");
        assert_eq!(
            stmt.condition,
            Some(ValueTest {
                left: Value::Column(col("x", "y")),
                cmp: Cmp::Eq,
                right: Value::Literal(Datum::Str("z".to_string())),
            })
        );
    }

    #[test]
    fn test_multiline_query() {
        let src = "SELECT a.x\nFROM a\nJOIN b\nON a.x = b.x";
        assert!(parse_query(src).is_ok());
    }

    #[test]
    fn test_empty_column_list() {
        assert_eq!(
            parse_query("SELECT FROM Employees").unwrap_err(),
            Error::Syntax {
                expected: "column reference".to_string(),
                found: "FROM".to_string(),
                at: 7,
            }
        );
    }

    #[test]
    fn test_unqualified_column() {
        assert_eq!(
            parse_query("SELECT name FROM Employees").unwrap_err(),
            Error::Syntax {
                expected: "'.'".to_string(),
                found: "FROM".to_string(),
                at: 12,
            }
        );
    }

    #[test]
    fn test_missing_comparison() {
        assert_eq!(
            parse_query("SELECT a.x FROM a WHERE a.x").unwrap_err(),
            Error::Syntax {
                expected: "comparison operator".to_string(),
                found: "end of query".to_string(),
                at: 27,
            }
        );
    }

    #[test]
    fn test_trailing_tokens() {
        assert_eq!(
            parse_query("SELECT a.x FROM a b.c").unwrap_err(),
            Error::Syntax {
                expected: "end of query".to_string(),
                found: "identifier \"b\"".to_string(),
                at: 18,
            }
        );
    }

    #[test]
    fn test_join_requires_on() {
        let err = parse_query("SELECT a.x FROM a JOIN b WHERE a.x = 1").unwrap_err();
        assert_eq!(
            err,
            Error::Syntax {
                expected: "ON".to_string(),
                found: "WHERE".to_string(),
                at: 25,
            }
        );
    }

    #[test]
    fn test_lex_error_propagates() {
        assert_eq!(
            parse_query("SELECT a.x FROM a WHERE a.x = #").unwrap_err(),
            Error::Lex { found: '#', at: 30 }
        );
    }
}
