//! Tests for the lexer and statement recognizer

use super::*;

#[test]
fn test_lex_numbers() {
    let tokens = Lexer::tokenize("42 3.5 0x1F 2.0f");
    assert_eq!(tokens[0].kind, TokenKind::Int(42));
    assert_eq!(tokens[1].kind, TokenKind::Float(3.5));
    assert_eq!(tokens[2].kind, TokenKind::Int(31));
    assert_eq!(tokens[3].kind, TokenKind::Float(2.0));
}

#[test]
fn test_lex_literals_and_keywords() {
    let tokens = Lexer::tokenize("'a' \"hi\\n\" true false nullptr NULL name_1");
    assert_eq!(tokens[0].kind, TokenKind::CharLit('a'));
    assert_eq!(tokens[1].kind, TokenKind::Str("hi\n".to_string()));
    assert_eq!(tokens[2].kind, TokenKind::Bool(true));
    assert_eq!(tokens[3].kind, TokenKind::Bool(false));
    assert_eq!(tokens[4].kind, TokenKind::Null);
    assert_eq!(tokens[5].kind, TokenKind::Null);
    assert_eq!(tokens[6].kind, TokenKind::Ident("name_1".to_string()));
}

#[test]
fn test_lex_operators() {
    let tokens = Lexer::tokenize("++ -- += -= *= /= == != <= >= -> && ||");
    let kinds: Vec<&TokenKind> = tokens.iter().map(|t| &t.kind).collect();
    assert_eq!(
        kinds[..13],
        [
            &TokenKind::PlusPlus,
            &TokenKind::MinusMinus,
            &TokenKind::PlusEq,
            &TokenKind::MinusEq,
            &TokenKind::StarEq,
            &TokenKind::SlashEq,
            &TokenKind::EqEq,
            &TokenKind::NotEq,
            &TokenKind::Le,
            &TokenKind::Ge,
            &TokenKind::Arrow,
            &TokenKind::AndAnd,
            &TokenKind::OrOr,
        ]
    );
}

#[test]
fn test_lex_spans_slice_source() {
    let source = "x = y + 1";
    let tokens = Lexer::tokenize(source);
    assert_eq!(&source[tokens[2].start..tokens[2].end], "y");
    assert_eq!(&source[tokens[2].start..], "y + 1");
}

#[test]
fn test_lex_never_fails() {
    let tokens = Lexer::tokenize("@ $ ^ ~");
    assert!(tokens
        .iter()
        .take(4)
        .all(|t| matches!(t.kind, TokenKind::Unknown(_))));
}

#[test]
fn test_strip_line() {
    assert_eq!(strip_line("int x = 1; // init"), "int x = 1");
    assert_eq!(strip_line("  x = 2;  "), "x = 2");
    assert_eq!(strip_line("y = \"a // b\";"), "y = \"a // b\"");
}

#[test]
fn test_recognize_primitive_decl() {
    for ty in PRIMITIVE_TYPES {
        let stmt = recognize(&format!("{} v = 1;", ty)).unwrap();
        match stmt {
            Statement::PrimitiveDecl { ty: t, name, init } => {
                assert_eq!(t, ty);
                assert_eq!(name, "v");
                assert_eq!(init, "1");
            }
            other => panic!("expected PrimitiveDecl, got {:?}", other),
        }
    }

    let stmt = recognize("int sum = x + y;").unwrap();
    assert_eq!(
        stmt,
        Statement::PrimitiveDecl {
            ty: "int".to_string(),
            name: "sum".to_string(),
            init: "x + y".to_string(),
        }
    );
}

#[test]
fn test_recognize_array_decl() {
    let stmt = recognize("int arr[5] = {1, 2, 3, 4, 5};").unwrap();
    match stmt {
        Statement::ArrayDecl { ty, name, init } => {
            assert_eq!(ty, "int");
            assert_eq!(name, "arr");
            assert_eq!(init, vec!["1", "2", "3", "4", "5"]);
        }
        other => panic!("expected ArrayDecl, got {:?}", other),
    }

    // declared length is ignored; the initializer decides
    let stmt = recognize("int a[9] = {1, 2};").unwrap();
    match stmt {
        Statement::ArrayDecl { init, .. } => assert_eq!(init.len(), 2),
        other => panic!("expected ArrayDecl, got {:?}", other),
    }

    // no length is fine too
    assert!(matches!(
        recognize("int a[] = {7};"),
        Some(Statement::ArrayDecl { .. })
    ));
}

#[test]
fn test_recognize_array_element_assign() {
    let stmt = recognize("arr[2] = arr[2] * 2;").unwrap();
    assert_eq!(
        stmt,
        Statement::ArrayElemAssign {
            name: "arr".to_string(),
            index: 2,
            expr: "arr[2] * 2".to_string(),
        }
    );

    // non-literal indices are not recognized
    assert!(recognize("arr[i] = 1;").is_none());
}

#[test]
fn test_recognize_pointer_decls() {
    assert_eq!(
        recognize("Node* head = new Node();").unwrap(),
        Statement::PointerDeclNew {
            ty: "Node".to_string(),
            name: "head".to_string(),
            alloc_ty: "Node".to_string(),
        }
    );
    assert_eq!(
        recognize("int* p = &x;").unwrap(),
        Statement::PointerDeclAddr {
            ty: "int".to_string(),
            name: "p".to_string(),
            target: "x".to_string(),
        }
    );
    assert_eq!(
        recognize("Node* q = nullptr;").unwrap(),
        Statement::PointerDeclNull {
            ty: "Node".to_string(),
            name: "q".to_string(),
        }
    );
    assert_eq!(
        recognize("Node* q = NULL;").unwrap(),
        Statement::PointerDeclNull {
            ty: "Node".to_string(),
            name: "q".to_string(),
        }
    );
}

#[test]
fn test_recognize_member_statements() {
    assert_eq!(
        recognize("head->data = 10;").unwrap(),
        Statement::FieldAssign {
            ptr: "head".to_string(),
            field: "data".to_string(),
            expr: "10".to_string(),
        }
    );

    // `name = src->field` wins over plain reassignment
    assert_eq!(
        recognize("walk = head->next;").unwrap(),
        Statement::FieldCopy {
            name: "walk".to_string(),
            src: "head".to_string(),
            field: "next".to_string(),
        }
    );

    // anything beyond the bare member access is a plain reassignment
    assert_eq!(
        recognize("x = head->next + 1;").unwrap(),
        Statement::Reassign {
            name: "x".to_string(),
            expr: "head->next + 1".to_string(),
        }
    );
}

#[test]
fn test_recognize_incdec_and_compound() {
    assert_eq!(
        recognize("i++;").unwrap(),
        Statement::IncDec {
            name: "i".to_string(),
            delta: 1
        }
    );
    assert_eq!(
        recognize("--i;").unwrap(),
        Statement::IncDec {
            name: "i".to_string(),
            delta: -1
        }
    );
    assert_eq!(
        recognize("total *= 3;").unwrap(),
        Statement::CompoundAssign {
            name: "total".to_string(),
            op: '*',
            expr: "3".to_string(),
        }
    );
}

#[test]
fn test_recognize_swap() {
    assert_eq!(
        recognize("swap(arr[0], arr[3]);").unwrap(),
        Statement::Swap {
            name: "arr".to_string(),
            i: 0,
            j: 3,
        }
    );
    // different arrays are not the supported shape
    assert!(recognize("swap(a[0], b[1]);").is_none());
}

#[test]
fn test_unrecognized_lines() {
    assert!(recognize("return 0;").is_none());
    assert!(recognize("cout << x;").is_none());
    assert!(recognize("int x;").is_none());
    assert!(recognize("{").is_none());
    assert!(recognize("").is_none());
    assert!(recognize("Node* next;").is_none());
}

#[test]
fn test_structural_lines() {
    for line in [
        "",
        "{",
        "}",
        "#include <iostream>",
        "return 0;",
        "cout << x << endl;",
        "std::cout << x;",
        "cin >> n;",
        "for (int i = 0; i < 5; i++)",
        "while (x > 0)",
        "if (x == 1)",
        "struct Node{int data;};",
        "int main()",
        "delete p;",
    ] {
        assert!(is_structural(line), "expected structural: {:?}", line);
    }

    assert!(!is_structural("int x = 1;"));
    assert!(!is_structural("x = 2;"));
    assert!(!is_structural("head->data = 10;"));
}
