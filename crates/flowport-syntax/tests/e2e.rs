//! End-to-end tests for flowport-syntax using insta for snapshot testing.
//!
//! These tests drive the public rewrite API over realistic declaration files
//! and cover the guarantees callers rely on: targeted substitution, docblock
//! annotation, no-op detection, idempotence, and per-file error reporting.

use std::thread;

use insta::assert_snapshot;
use rstest::{fixture, rstest};

use flowport_syntax::{DeclarationDialect, NameMapping, Rewriter, SyntaxError, rewrite};

/// Mapping shaped like the one derived from the Lexical packages.
#[fixture]
fn www_mapping() -> NameMapping {
    [
        ("lexical", "Lexical"),
        ("@lexical/utils", "LexicalUtils"),
        ("@lexical/rich-text", "LexicalRichText"),
        ("@lexical/react/LexicalComposer", "LexicalComposer"),
        ("@lexical/react/LexicalComposerContext", "LexicalComposerContext"),
    ]
    .into_iter()
    .collect()
}

const RICH_TEXT_FLOW: &str = r"/**
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 *
 * @flow strict
 */

import type {
  EditorConfig,
  LexicalNode,
  NodeKey,
  // Keep this comment where it is.
  ParagraphNode,
} from 'lexical';
import {ElementNode} from 'lexical';
import type {InitialEditorStateType} from '@lexical/react/LexicalComposer';
import {mergeRegister} from '@lexical/utils';
import type {Thing} from './local';

declare export class HeadingNode extends ElementNode {
  __tag: HeadingTagType;
  static getType(): string;
  constructor(tag: HeadingTagType, key?: NodeKey): void;
  createDOM(config: EditorConfig): HTMLElement;
}

export type HeadingTagType = 'h1' | 'h2' | 'h3' | 'h4' | 'h5' | 'h6';
declare export function $isHeadingNode(node: ?LexicalNode): boolean %checks(node instanceof HeadingNode);
";

// =============================================================================
// Happy Path: Full Declaration File
// =============================================================================

#[rstest]
fn rewrites_flow_declaration_file(www_mapping: NameMapping) {
    let result = rewrite(RICH_TEXT_FLOW, &www_mapping).unwrap_or_else(|err| panic!("{err}"));

    assert!(result.has_changes());
    assert_eq!(result.replaced_imports(), 4);
    assert!(result.docblock_annotated());
    assert_snapshot!(result.output(), @r"
    /**
     * Copyright (c) Meta Platforms, Inc. and affiliates.
     *
     * This source code is licensed under the MIT license found in the
     * LICENSE file in the root directory of this source tree.
     *
     * @flow strict
     * @generated
     * @oncall lexical_web_text_editor
     */

    import type {
      EditorConfig,
      LexicalNode,
      NodeKey,
      // Keep this comment where it is.
      ParagraphNode,
    } from 'Lexical';
    import {ElementNode} from 'Lexical';
    import type {InitialEditorStateType} from 'LexicalComposer';
    import {mergeRegister} from 'LexicalUtils';
    import type {Thing} from './local';

    declare export class HeadingNode extends ElementNode {
      __tag: HeadingTagType;
      static getType(): string;
      constructor(tag: HeadingTagType, key?: NodeKey): void;
      createDOM(config: EditorConfig): HTMLElement;
    }

    export type HeadingTagType = 'h1' | 'h2' | 'h3' | 'h4' | 'h5' | 'h6';
    declare export function $isHeadingNode(node: ?LexicalNode): boolean %checks(node instanceof HeadingNode);
    ");
}

#[rstest]
fn only_the_targeted_literal_changes() {
    let mapping: NameMapping = [("lexical/Foo", "LexicalFoo")].into_iter().collect();
    let source = "// header\nimport   x   from \"lexical/Foo\" ;   // trailing\nexport type Y = x;\n";

    let result = rewrite(source, &mapping).unwrap_or_else(|err| panic!("{err}"));

    assert_eq!(
        result.output(),
        "// header\nimport   x   from \"LexicalFoo\" ;   // trailing\nexport type Y = x;\n"
    );
}

#[rstest]
fn nested_module_imports_are_rewritten(www_mapping: NameMapping) {
    let source = "declare module 'shim' {\n  import type {LexicalEditor} from 'lexical';\n  declare module.exports: {editor: LexicalEditor};\n}\n";

    let result = rewrite(source, &www_mapping).unwrap_or_else(|err| panic!("{err}"));

    assert_eq!(result.replaced_imports(), 1);
    assert!(result.output().contains("from 'Lexical';"));
    assert!(result.output().starts_with("declare module 'shim' {"));
}

// =============================================================================
// No-op and Idempotence
// =============================================================================

#[rstest]
#[case("/**\n * @flow\n */\nimport {x} from './x';\n")]
#[case("/**\n * @flow strict-local\n */\nexport type T = number;\n")]
#[case("")]
#[case("declare export var version: string;\n")]
fn unmapped_files_round_trip_unchanged(www_mapping: NameMapping, #[case] source: &str) {
    let result = rewrite(source, &www_mapping).unwrap_or_else(|err| panic!("{err}"));

    assert!(!result.has_changes());
    assert_eq!(result.output(), source);
}

#[rstest]
fn empty_mapping_only_annotates_docblock() {
    let empty = NameMapping::new();

    let plain = rewrite("import x from 'lexical';\n", &empty).unwrap_or_else(|err| panic!("{err}"));
    assert!(!plain.has_changes());

    let strict = rewrite("/**\n * @flow strict\n */\nimport x from 'lexical';\n", &empty)
        .unwrap_or_else(|err| panic!("{err}"));
    assert!(strict.has_changes());
    assert_eq!(strict.replaced_imports(), 0);
    assert!(strict.output().ends_with("import x from 'lexical';\n"));
}

#[test]
fn byte_order_mark_does_not_hide_the_docblock() {
    let source = "\u{feff}/**\n * @flow strict\n */\nimport x from 'lexical';\n";
    let result = rewrite(source, &NameMapping::new()).unwrap_or_else(|err| panic!("{err}"));

    assert!(result.docblock_annotated());
    assert_eq!(
        result.output(),
        "\u{feff}/**\n * @flow strict\n * @generated\n * @oncall lexical_web_text_editor\n */\nimport x from 'lexical';\n"
    );
}

#[rstest]
fn flag_line_closing_the_docblock_is_annotated(www_mapping: NameMapping) {
    let source = "/**\n * @flow strict */\nimport x from 'lexical';\n";
    let result = rewrite(source, &www_mapping).unwrap_or_else(|err| panic!("{err}"));

    assert!(result.docblock_annotated());
    assert_snapshot!(result.output(), @r"
    /**
     * @flow strict
     * @generated
     * @oncall lexical_web_text_editor */
    import x from 'Lexical';
    ");
}

#[rstest]
fn rewriting_is_idempotent(www_mapping: NameMapping) {
    let once = rewrite(RICH_TEXT_FLOW, &www_mapping).unwrap_or_else(|err| panic!("{err}"));
    let twice = rewrite(once.output(), &www_mapping).unwrap_or_else(|err| panic!("{err}"));

    assert!(!twice.has_changes());
    assert_eq!(twice.output(), once.output());
}

// =============================================================================
// TypeScript Declarations
// =============================================================================

#[rstest]
fn rewrites_typescript_declarations(www_mapping: NameMapping) {
    let source = "/**\n * @flow strict\n */\nimport type { LexicalEditor } from 'lexical';\nimport { mergeRegister } from \"@lexical/utils\";\nexport declare function register(editor: LexicalEditor): () => void;\n";

    let result = Rewriter::new(DeclarationDialect::TypeScript)
        .rewrite(source, &www_mapping)
        .unwrap_or_else(|err| panic!("{err}"));

    assert_eq!(result.replaced_imports(), 2);
    assert_snapshot!(result.output(), @r#"
    /**
     * @flow strict
     * @generated
     * @oncall lexical_web_text_editor
     */
    import type { LexicalEditor } from 'Lexical';
    import { mergeRegister } from "LexicalUtils";
    export declare function register(editor: LexicalEditor): () => void;
    "#);
}

// =============================================================================
// Unhappy Path
// =============================================================================

#[rstest]
#[case(DeclarationDialect::Flow, "import x from 'lexical")]
#[case(DeclarationDialect::Flow, "declare export class A {\n")]
#[case(DeclarationDialect::TypeScript, "import { x from 'lexical';")]
fn malformed_input_is_a_parse_error(
    www_mapping: NameMapping,
    #[case] dialect: DeclarationDialect,
    #[case] source: &str,
) {
    let error = Rewriter::new(dialect)
        .rewrite(source, &www_mapping)
        .expect_err("malformed input must not produce output");

    match error {
        SyntaxError::ParseError {
            dialect: reported, ..
        } => assert_eq!(reported, dialect),
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn parse_error_message_names_the_position() {
    let error = rewrite("/**\n * @flow strict\n */\nimport x from 'lexical\n", &NameMapping::new())
        .expect_err("unterminated literal");

    assert_eq!(
        error.to_string(),
        "failed to parse flow at 4:15: unterminated string literal"
    );
}

// =============================================================================
// Concurrency
// =============================================================================

#[rstest]
fn rewrites_share_one_mapping_across_threads(www_mapping: NameMapping) {
    let rewriter = Rewriter::default();
    let sources: Vec<String> = (0..8)
        .map(|n| format!("import type {{T{n}}} from '@lexical/rich-text';\n"))
        .collect();

    let outputs: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| {
                let mapping = &www_mapping;
                let rewriter = &rewriter;
                scope.spawn(move || {
                    rewriter
                        .rewrite(source, mapping)
                        .map(|result| result.into_output())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| panic!("rewrite thread panicked"))
                    .unwrap_or_else(|err| panic!("{err}"))
            })
            .collect()
    });

    for (n, output) in outputs.iter().enumerate() {
        assert_eq!(output, &format!("import type {{T{n}}} from 'LexicalRichText';\n"));
    }
}
