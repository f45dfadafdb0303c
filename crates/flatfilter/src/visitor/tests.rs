use super::*;
use crate::{
    TEMPLATE_FUNCTION_NAME,
    error::StateError,
    model::{FilterNode, TreeModelBuilder},
    structured::{
        ComparisonNode, ComparisonOperator, Expression, FunctionExpression, SpatialNode,
        SpatialOperator, StructuredFilter, StructuredModelBuilder,
    },
    test_support::{Shape, arb_literal, arb_shape, build_mixed, build_nested, init_tracing},
    value::Literal,
};
use proptest::prelude::*;

fn tree_of(f: impl FnOnce(&mut TreeModelBuilder) -> Result<(), FilterError>) -> Arc<FilterNode> {
    let mut builder = TreeModelBuilder::default();
    f(&mut builder).unwrap();

    builder.get_result().unwrap()
}

fn structured_of(
    f: impl FnOnce(&mut StructuredModelBuilder) -> Result<(), FilterError>,
) -> Arc<StructuredFilter> {
    let mut builder = StructuredModelBuilder::default();
    f(&mut builder).unwrap();

    builder.get_result().unwrap()
}

fn property(name: &str) -> Expression {
    Expression::PropertyName(name.to_string())
}

fn vocabulary_err<T>(result: Result<T, FilterError>) -> VocabularyError {
    match result {
        Err(FilterError::Vocabulary(err)) => err,
        Err(err) => panic!("expected vocabulary error, got {err}"),
        Ok(_) => panic!("expected vocabulary error, transform succeeded"),
    }
}

#[test]
fn tree_to_structured_matches_direct_build() {
    init_tracing();
    let tree = tree_of(build_mixed);

    let structured = transform(tree.as_ref(), StructuredModelBuilder::default()).unwrap();

    assert_eq!(structured, structured_of(build_mixed));
}

#[test]
fn structured_to_tree_matches_direct_build() {
    let structured = structured_of(build_nested);

    let tree = transform(structured.as_ref(), TreeModelBuilder::default()).unwrap();

    assert_eq!(tree, tree_of(build_nested));
}

#[test]
fn templated_values_survive_the_structured_detour() {
    let tree = tree_of(build_mixed);
    let structured = transform(tree.as_ref(), StructuredModelBuilder::default()).unwrap();

    let back = transform(structured.as_ref(), TreeModelBuilder::default()).unwrap();

    assert_eq!(back, tree);
    let FilterNode::Terminal(after) = &back.children()[0].children()[1] else {
        panic!("expected templated terminal, got {back}");
    };
    assert!(after.is_templated());
}

#[test]
fn tree_to_tree_is_identity() {
    let tree = tree_of(build_mixed);

    let copy = transform(tree.as_ref(), TreeModelBuilder::default()).unwrap();

    assert_eq!(copy, tree);
    assert!(!Arc::ptr_eq(&copy, &tree));
}

#[test]
fn visit_describes_nodes_in_builder_vocabulary() {
    let tree = tree_of(build_nested);

    let Visit::Composite { op, children } = tree.visit().unwrap() else {
        panic!("expected composite visit");
    };
    assert_eq!(op, LogicalOp::And);
    assert_eq!(children.len(), 2);
    assert_eq!(
        children[0].visit().unwrap(),
        Visit::Terminal {
            op: TerminalOp::Equal,
            subject: Subject::Property("name".to_string()),
            value: TerminalValue::Plain(Literal::text("Bob")),
        }
    );
}

#[test]
fn spatial_node_with_three_expressions_is_unrepresentable() {
    let node = StructuredFilter::Spatial(SpatialNode {
        op: SpatialOperator::Intersects,
        expressions: vec![
            property("geom"),
            Expression::Literal(Literal::text("POINT(0 0)")),
            Expression::Literal(Literal::text("POINT(1 1)")),
        ],
    });

    let err = vocabulary_err(transform(&node, TreeModelBuilder::default()));

    assert!(matches!(
        err,
        VocabularyError::UnrepresentableNode { ref op, .. } if op == "INTERSECTS"
    ));
}

#[test]
fn function_subject_is_unrepresentable() {
    let node = StructuredFilter::Comparison(ComparisonNode {
        op: ComparisonOperator::PropertyIsEqualTo,
        expressions: vec![
            Expression::Function(FunctionExpression {
                name: "strlen".to_string(),
                args: vec![property("name")],
            }),
            Expression::Literal(Literal::Int(3)),
        ],
    });

    let err = vocabulary_err(transform(&node, TreeModelBuilder::default()));

    assert!(matches!(err, VocabularyError::UnrepresentableNode { .. }));
}

#[test]
fn property_as_value_is_unrepresentable() {
    let node = StructuredFilter::Comparison(ComparisonNode {
        op: ComparisonOperator::PropertyIsLessThan,
        expressions: vec![property("start"), property("end")],
    });

    let err = vocabulary_err(transform(&node, TreeModelBuilder::default()));

    assert!(matches!(err, VocabularyError::UnrepresentableNode { .. }));
}

#[test]
fn malformed_template_function_is_unrepresentable() {
    let node = StructuredFilter::Comparison(ComparisonNode {
        op: ComparisonOperator::PropertyIsEqualTo,
        expressions: vec![
            property("name"),
            Expression::Function(FunctionExpression {
                name: TEMPLATE_FUNCTION_NAME.to_string(),
                args: vec![Expression::Literal(Literal::text("default"))],
            }),
        ],
    });

    let err = vocabulary_err(transform(&node, TreeModelBuilder::default()));

    assert!(matches!(err, VocabularyError::UnrepresentableNode { .. }));
}

#[test]
fn invalid_function_metadata_fails_the_transform() {
    let shape = Shape::Function {
        op: TerminalOp::Equal,
        subject: Subject::LiteralProperty(Literal::Bool(true)),
        // a source that never went through FunctionCall::new
        call: FunctionCall {
            name: "not valid".to_string(),
            args: vec![Literal::Int(1)],
        },
    };

    let err = vocabulary_err(transform(&shape, TreeModelBuilder::default()));

    assert!(matches!(err, VocabularyError::MalformedFunction { .. }));
}

#[test]
fn reserved_template_name_never_reaches_a_function_node() {
    let shape = Shape::Function {
        op: TerminalOp::Equal,
        subject: Subject::Property("p".to_string()),
        call: FunctionCall {
            name: TEMPLATE_FUNCTION_NAME.to_string(),
            args: vec![
                Literal::text("d"),
                Literal::text("id"),
                Literal::Bool(true),
                Literal::Bool(false),
            ],
        },
    };

    for err in [
        vocabulary_err(transform(&shape, TreeModelBuilder::default())),
        vocabulary_err(transform(&shape, StructuredModelBuilder::default())),
    ] {
        assert!(matches!(err, VocabularyError::MalformedFunction { .. }));
    }
}

#[test]
fn transform_into_used_builder_fails_with_protocol_error() {
    let tree = tree_of(build_nested);
    let mut used = TreeModelBuilder::default();
    build_nested(&mut used).unwrap();

    let err = transform(tree.as_ref(), used).unwrap_err();

    assert_eq!(err, FilterError::State(StateError::RootAlreadySet));
}

#[test]
fn replay_nests_inside_an_open_composite() {
    let inner = tree_of(build_nested);
    let mut builder = StructuredModelBuilder::default();
    builder.begin_composite("OR").unwrap();
    replay(inner.as_ref(), &mut builder).unwrap();
    builder.end_composite().unwrap();

    let root = builder.get_result().unwrap();

    assert_eq!(root.element(), "Or");
    assert_eq!(root.children()[0], *structured_of(build_nested));
}

proptest! {
    #[test]
    fn shapes_round_trip_through_both_backends(shape in arb_shape()) {
        let tree = transform(&shape, TreeModelBuilder::default()).unwrap();
        let structured = transform(tree.as_ref(), StructuredModelBuilder::default()).unwrap();
        let back = transform(structured.as_ref(), TreeModelBuilder::default()).unwrap();

        prop_assert_eq!(back.as_ref(), tree.as_ref());
        prop_assert_eq!(
            transform(back.as_ref(), StructuredModelBuilder::default()).unwrap(),
            structured
        );
    }

    #[test]
    fn literal_subjects_replay_unchanged(literal in arb_literal(), value in arb_literal()) {
        let shape = Shape::Terminal {
            op: TerminalOp::NotEqual,
            subject: Subject::LiteralProperty(literal.clone()),
            value: TerminalValue::Plain(value.clone()),
        };

        let structured = transform(&shape, StructuredModelBuilder::default()).unwrap();

        prop_assert_eq!(
            structured.expressions(),
            [Expression::Literal(literal), Expression::Literal(value)]
        );
    }
}
