//! End-to-end scenarios: parse a stylesheet, match it against a tree, expand
//! declaration values.

use pretty_assertions::assert_eq;

use patina::{
    parse, ElementData, ElementId, ElementTree, Styler, Token, TokenKind, UnitTable,
};

fn text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// figure > group.shapes > (line#first, line.dashed, text.caption)
fn drawing() -> (ElementTree, ElementId, ElementId, ElementId, ElementId) {
    let mut tree = ElementTree::new();
    let figure = tree.insert(ElementData::new("figure"));
    let group = tree.insert_child(figure, ElementData::new("group").with_class("shapes"));
    let first = tree.insert_child(
        group,
        ElementData::new("line")
            .with_id("first")
            .with_attr("length", "3475mm"),
    );
    let second = tree.insert_child(
        group,
        ElementData::new("line")
            .with_class("dashed")
            .with_attr("width", "5"),
    );
    let caption = tree.insert_child(
        group,
        ElementData::new("text")
            .with_class("caption")
            .with_attr("title", "aabfooaabfooabfoob"),
    );
    (tree, figure, first, second, caption)
}

fn screen_units() -> UnitTable {
    UnitTable::new()
        .with_factor("px", 1.0)
        .with_factor("pt", 96.0 / 72.0)
        .with_factor("in", 96.0)
        .with_factor("cm", 96.0 / 2.54)
        .with_factor("mm", 96.0 / 25.4)
}

#[test]
fn child_chain_vs_descendant() {
    let (tree, figure, first, ..) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    // Exact chain: parent must be group, grandparent figure.
    let sheet = parse("figure > group > line { color: red; }").stylesheet;
    assert_eq!(text(&styler.compute(&sheet, &first)["color"]), "red");
    assert!(styler.compute(&sheet, &figure).is_empty());

    // Descendant: any ancestor qualifies, intervening nodes do not matter.
    let sheet = parse("figure line { color: blue; }").stylesheet;
    assert_eq!(text(&styler.compute(&sheet, &first)["color"]), "blue");

    // Wrong chain order never matches.
    let sheet = parse("line > group { color: red; }").stylesheet;
    assert!(styler.compute(&sheet, &first).is_empty());
}

#[test]
fn group_alternatives() {
    let (tree, _figure, first, second, _caption) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    let sheet = parse("#first, .dashed { marked: yes; }").stylesheet;
    assert!(styler.compute(&sheet, &first).contains_key("marked"));
    assert!(styler.compute(&sheet, &second).contains_key("marked"));
}

#[test]
fn calc_with_attr_and_units() {
    let (tree, _figure, first, ..) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    let sheet = parse("#first { length: calc(attr(length mm) + 5mm); }").stylesheet;
    let computed = styler.compute(&sheet, &first);
    let token = &computed["length"][0];
    assert_eq!(token.kind, TokenKind::Dimension);
    assert_eq!(token.value, Some(3480.0));
    assert_eq!(token.unit.as_deref(), Some("mm"));
}

#[test]
fn string_functions_in_declarations() {
    let (tree, _figure, _first, _second, caption) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    let sheet = parse(
        ".caption { label: concat(\"<\", replace(attr(title), \"a*b\", \"-\"), \">\"); }",
    )
    .stylesheet;
    let computed = styler.compute(&sheet, &caption);
    assert_eq!(
        computed["label"][0].string.as_deref(),
        Some("<-foo-foo-foo->")
    );
}

#[test]
fn custom_properties_cascade_and_expand() {
    let (tree, _figure, _first, second, _caption) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    let sheet = parse(
        "line { --w: attr(width number); } \
         .dashed { --w: calc(attr(width number) * 2); } \
         line { stroke-width: var(--w); }",
    )
    .stylesheet;
    let computed = styler.compute(&sheet, &second);
    // The later .dashed definition of --w wins.
    assert_eq!(computed["stroke-width"][0].value, Some(10.0));
}

#[test]
fn cyclic_custom_property_skips_only_its_declaration() {
    let (tree, _figure, first, ..) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    let sheet = parse(
        "line { --a: var(--b); --b: var(--a); } \
         line { broken: var(--a); fine: 1; }",
    )
    .stylesheet;
    let resolved = styler.resolve(&sheet, &first);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].0, "fine");
}

#[test]
fn recovery_keeps_styling_the_rest() {
    let (tree, _figure, first, ..) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    let result = parse(
        "line { color red } \
         ?? bogus ?? { x: 1; } \
         #first { color: green; }",
    );
    assert_eq!(result.errors.len(), 2);
    let computed = styler.compute(&result.stylesheet, &first);
    assert_eq!(text(&computed["color"]), "green");
}

#[test]
fn at_rules_do_not_style() {
    let (tree, _figure, first, ..) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    let result = parse(
        "@import \"base.css\"; \
         @media print { line { color: black; } } \
         line { color: red; }",
    );
    assert!(result.is_clean());
    let computed = styler.compute(&result.stylesheet, &first);
    // Only the top-level rule applies; the @media block is uninterpreted.
    assert_eq!(text(&computed["color"]), "red");
}

#[test]
fn attribute_predicates_end_to_end() {
    let (tree, _figure, first, second, _caption) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    let sheet = parse(
        "[length] { has-length: yes; } \
         [length$=mm] { metric: yes; } \
         [width=5] { narrow: yes; }",
    )
    .stylesheet;
    let computed = styler.compute(&sheet, &first);
    assert!(computed.contains_key("has-length"));
    assert!(computed.contains_key("metric"));
    assert!(!computed.contains_key("narrow"));
    assert!(styler.compute(&sheet, &second).contains_key("narrow"));
}

#[test]
fn messy_input_never_panics() {
    let (tree, _figure, first, ..) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    for input in [
        "",
        "}}}}",
        "a { b: 'unterminated",
        "a { b: url(half",
        "@media { { {",
        "line { x: calc(((((; }",
        "\u{0}\u{1}\u{2}",
    ] {
        let result = parse(input);
        let _ = styler.resolve(&result.stylesheet, &first);
    }
}

#[test]
fn resolved_pairs_come_in_stylesheet_order() {
    let (tree, _figure, first, ..) = drawing();
    let units = screen_units();
    let styler = Styler::new(&tree, &units);

    let sheet = parse("line { a: 1; b: 2; } #first { a: 3; }").stylesheet;
    let resolved = styler.resolve(&sheet, &first);
    let properties: Vec<&str> = resolved.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(properties, vec!["a", "b", "a"]);
}
