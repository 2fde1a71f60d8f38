// tests/basic_topology.rs
use glam::Vec3;
use lsystem_tree::{Grammar, TreeSkeleton, TurtleConfig, TurtleInterpreter};
use std::collections::HashMap;

fn interpreter(start_radius: f32, end_radius: f32) -> TurtleInterpreter {
    TurtleInterpreter::new(TurtleConfig {
        angle: 90.0f32.to_radians(),
        step_length: 1.0,
        start_radius,
        end_radius,
        ..Default::default()
    })
}

fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-5, "{a} != {b}");
}

/// Rewrites symbol by symbol, recursing instead of iterating.
fn expand(symbol: char, rules: &HashMap<char, String>, depth: u32) -> String {
    match (depth, rules.get(&symbol)) {
        (0, _) | (_, None) => symbol.to_string(),
        (_, Some(rhs)) => rhs.chars().map(|c| expand(c, rules, depth - 1)).collect(),
    }
}

/// Terminal segments found by comparing endpoints, without parent links.
fn positional_terminals(skeleton: &TreeSkeleton) -> Vec<usize> {
    let s = &skeleton.segments;
    (0..s.len())
        .filter(|&i| !(0..s.len()).any(|j| j != i && s[j].from == s[i].to))
        .collect()
}

#[test]
fn test_grammar_identity_cases() {
    let empty = HashMap::new();
    for n in 0..5 {
        assert_eq!(lsystem_tree::generate("F[+F]x", &empty, n), "F[+F]x");
    }
    let g = Grammar::new("AB", 0).with_rule('A', "AB");
    assert_eq!(g.generate(), "AB");
}

#[test]
fn test_grammar_matches_direct_simulation() {
    let mut rules = HashMap::new();
    rules.insert('A', "AB".to_string());
    rules.insert('B', "A".to_string());

    assert_eq!(lsystem_tree::generate("A", &rules, 3), "ABAAB");

    let mut lengths = Vec::new();
    for n in 0..10 {
        let s = lsystem_tree::generate("A", &rules, n);
        assert_eq!(s, expand('A', &rules, n));
        lengths.push(s.len());
    }
    // Lengths follow the Fibonacci sequence.
    for w in lengths.windows(3) {
        assert_eq!(w[2], w[0] + w[1]);
    }
}

#[test]
fn test_straight_chain() {
    let skeleton = interpreter(1.0, 0.4).interpret("FFF");
    let s = &skeleton.segments;
    assert_eq!(s.len(), 3, "Should have 3 segments");

    assert_eq!(s[0].from, Vec3::ZERO);
    for i in 1..3 {
        assert_eq!(s[i].from, s[i - 1].to);
        assert_eq!(s[i].parent, Some(i - 1));
    }
    assert!(s[2].to.abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-5));

    // Equal steps of (0.4 - 1.0) / 3 from the start radius to the end radius.
    let expected = [(1.0, 0.8), (0.8, 0.6), (0.6, 0.4)];
    for (seg, (start, end)) in s.iter().zip(expected) {
        assert_close(seg.start_radius, start);
        assert_close(seg.end_radius, end);
    }
    assert!(skeleton.is_balanced());
}

#[test]
fn test_branch_shares_origin() {
    let skeleton = interpreter(0.2, 0.1).interpret("F[+F]F");
    let s = &skeleton.segments;
    assert_eq!(s.len(), 3);

    // Branch and trunk continuation both grow from the tip of the first segment.
    assert_eq!(s[1].from, s[0].to);
    assert_eq!(s[2].from, s[0].to);
    assert_eq!(s[1].parent, Some(0));
    assert_eq!(s[2].parent, Some(0));

    // Both children start where the trunk ends and reach the end radius.
    assert_close(s[0].end_radius, 0.15);
    for child in &s[1..] {
        assert_close(child.start_radius, 0.15);
        assert_close(child.end_radius, 0.1);
    }
    assert_eq!(skeleton.terminal_indices(), vec![1, 2]);
}

#[test]
fn test_turns_change_direction() {
    // Pitch by 90 degrees tips the turtle from +Y towards +Z.
    let skeleton = interpreter(1.0, 1.0).interpret("F^F");
    let s = &skeleton.segments;
    assert!(s[1].to.abs_diff_eq(Vec3::new(0.0, 1.0, 1.0), 1e-5));

    // Yaw spins around the direction of travel and leaves it unchanged.
    let skeleton = interpreter(1.0, 1.0).interpret("F+F");
    assert!(skeleton.segments[1].to.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));

    // Turning around walks straight back.
    let skeleton = interpreter(1.0, 1.0).interpret("F|F");
    assert!(skeleton.segments[1].to.abs_diff_eq(Vec3::ZERO, 1e-5));
}

#[test]
fn test_invisible_moves_and_ignored_symbols() {
    let skeleton = interpreter(1.0, 1.0).interpret("FfX!F");
    let s = &skeleton.segments;
    assert_eq!(s.len(), 3);
    // The move leaves a gap and breaks the parent chain.
    assert!(s[1].from.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
    assert_eq!(s[1].parent, None);
    assert_eq!(s[2].parent, Some(1));
    assert_eq!(skeleton.root_count(), 2);
}

#[test]
fn test_unbalanced_brackets_degrade_gracefully() {
    let skeleton = interpreter(1.0, 0.5).interpret("F]]F");
    assert_eq!(skeleton.len(), 2);
    assert_eq!(skeleton.unmatched_pops, 2);
    assert_eq!(skeleton.residual_branches, 0);
    assert_eq!(skeleton.segments[1].from, skeleton.segments[0].to);

    let skeleton = interpreter(1.0, 0.5).interpret("F[[+F");
    assert_eq!(skeleton.len(), 2);
    assert_eq!(skeleton.unmatched_pops, 0);
    assert_eq!(skeleton.residual_branches, 2);
    assert!(!skeleton.is_balanced());

    let skeleton = interpreter(1.0, 0.5).interpret("F[+F[-F]]F");
    assert!(skeleton.is_balanced());
}

#[test]
fn test_stack_limit_drops_pushes() {
    let interpreter = TurtleInterpreter::new(TurtleConfig {
        max_stack_depth: 1,
        ..Default::default()
    });
    let skeleton = interpreter.interpret("F[[F]]F");
    // The second push is dropped and its ']' skipped; the outer pair still matches.
    assert!(skeleton.is_balanced());
    assert_eq!(skeleton.len(), 3);
    assert_eq!(skeleton.segments[2].from, skeleton.segments[0].to);
    assert_eq!(skeleton.segments[2].parent, Some(0));

    let skeleton = interpreter.interpret("F[[F");
    assert_eq!(skeleton.residual_branches, 2);
}

#[test]
fn test_nesting_deeper_than_stack_limit_stays_balanced() {
    let depth = 1100;
    let commands = format!("F{}F{}F", "[+".repeat(depth), "]".repeat(depth));
    let config = TurtleConfig::default();
    assert!(config.max_stack_depth < depth);

    let skeleton = TurtleInterpreter::new(config).interpret(&commands);
    assert_eq!(skeleton.unmatched_pops, 0);
    assert_eq!(skeleton.residual_branches, 0);
    assert!(skeleton.is_balanced());
    assert_eq!(skeleton.len(), 3);
    // The outermost ']' returns the turtle to the tip of the trunk.
    assert_eq!(skeleton.segments[2].from, skeleton.segments[0].to);
    assert!(skeleton.segments[2].to.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0) * 0.07, 1e-5));
}

#[test]
fn test_single_segment_chains_keep_start_radius() {
    for commands in ["F", "[F][F]"] {
        let skeleton = interpreter(1.0, 0.5).interpret(commands);
        assert!(!skeleton.is_empty());
        for seg in &skeleton.segments {
            assert_close(seg.start_radius, 1.0);
            assert_close(seg.end_radius, 1.0);
        }
    }
}

#[test]
fn test_stray_pop_keeps_taper_continuous() {
    let skeleton = interpreter(1.0, 0.5).interpret("F]F");
    let s = &skeleton.segments;
    assert_eq!(skeleton.unmatched_pops, 1);
    assert_eq!(s[1].parent, Some(0));
    assert_close(s[0].start_radius, 1.0);
    assert_close(s[0].end_radius, 0.75);
    assert_close(s[1].start_radius, 0.75);
    assert_close(s[1].end_radius, 0.5);
}

#[test]
fn test_radius_never_increases_towards_tips() {
    let grammar = Grammar::default();
    let grammar = Grammar {
        iterations: 4,
        ..grammar
    };
    let skeleton = TurtleInterpreter::new(TurtleConfig::default()).interpret(&grammar.generate());
    assert!(!skeleton.is_empty());
    assert!(skeleton.is_balanced());

    let end = TurtleConfig::default().end_radius;
    for seg in &skeleton.segments {
        assert!(seg.end_radius <= seg.start_radius + 1e-6);
        if let Some(parent) = seg.parent {
            assert!(seg.start_radius <= skeleton.segments[parent].end_radius + 1e-6);
        }
    }
    for tip in skeleton.terminal_indices() {
        assert_close(skeleton.segments[tip].end_radius, end);
    }
}

#[test]
fn test_parent_links_agree_with_endpoints() {
    let grammar = Grammar {
        iterations: 3,
        ..Grammar::default()
    };
    let skeleton = TurtleInterpreter::new(TurtleConfig::default()).interpret(&grammar.generate());
    assert_eq!(skeleton.terminal_indices(), positional_terminals(&skeleton));
}

#[test]
fn test_single_segment_end_to_end() {
    let commands = Grammar::new("F", 2).generate();
    assert_eq!(commands, "F");
    let skeleton = interpreter(1.0, 1.0).interpret(&commands);
    assert_eq!(skeleton.len(), 1);
    let seg = skeleton.segments[0];
    assert_eq!(seg.from, Vec3::ZERO);
    assert!(seg.to.abs_diff_eq(Vec3::Y, 1e-6));
    assert_close(seg.start_radius, 1.0);
    assert_close(seg.end_radius, 1.0);
}
