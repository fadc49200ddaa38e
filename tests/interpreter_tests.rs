// File: tests/interpreter_tests.rs
//
// End-to-end tests for the yy interpreter, driven through the public
// `execute` boundary: each test runs a small program and checks the output
// delivered to the sink, or the structured error that came back.

use yy::{execute, ErrorKind, YyError};

fn run(source: &str) -> String {
    let mut out = String::new();
    execute(source, |text| out.push_str(text)).expect("program should succeed");
    out
}

fn run_err(source: &str) -> YyError {
    let mut out = String::new();
    execute(source, |text| out.push_str(text)).expect_err("program should fail")
}

#[test]
fn arithmetic_and_yap() {
    assert_eq!(run("x := 1 yap(x + 1)"), "2\n");
}

#[test]
fn numbers_render_without_trailing_zero() {
    assert_eq!(run("yap(1.5) yap(3.0) yap(2 / 4)"), "1.5\n3\n0.5\n");
}

#[test]
fn yelp_emits_fragments_without_newline() {
    assert_eq!(run("yelp(\"a\") yelp(\"b\") yap(\"c\")"), "abc\n");
}

#[test]
fn string_interpolation() {
    assert_eq!(run("name := \"yy\" yap(\"hi {name}, {1 + 2}\")"), "hi yy, 3\n");
}

#[test]
fn interpolation_may_contain_strings() {
    assert_eq!(run("yap(\"{\"a\" + \"b\"}\")"), "ab\n");
}

#[test]
fn comments_are_skipped() {
    assert_eq!(run("// leading\nyap(1) // trailing"), "1\n");
}

#[test]
fn ascending_range_loop() {
    assert_eq!(run("yall 1..5 { yelp(yt) }"), "12345");
}

#[test]
fn descending_range_loop() {
    assert_eq!(run("yall 5..1 { yelp(yt) }"), "54321");
}

#[test]
fn single_member_range() {
    assert_eq!(run("yall 0..0 { yelp(yt) }"), "0");
}

#[test]
fn bare_number_iterates_from_zero() {
    assert_eq!(run("yall 3 { yelp(yt) }"), "0123");
}

#[test]
fn yall_over_string_visits_chars() {
    assert_eq!(run("yall c: \"abc\" { yelp(c) yelp(c) }"), "aabbcc");
}

#[test]
fn yall_over_map_visits_keys_in_insertion_order() {
    assert_eq!(run("m := %{\"b\": 1, \"a\": 2} yall k: m { yelp(k) }"), "ba");
}

#[test]
fn nested_loops_with_named_binders() {
    let out = run("yall r: 0..1 { yall c: 0..1 { yelp(\"{r}{c} \") } }");
    assert_eq!(out, "00 01 10 11 ");
}

#[test]
fn declaration_shadows_inside_blocks() {
    let out = run("x := 1\nyif true { x := 2 yap(x) }\nyap(x)");
    assert_eq!(out, "2\n1\n");
}

#[test]
fn assignment_reaches_the_outer_binding() {
    assert_eq!(run("x := 1 yif true { x = 2 } yap(x)"), "2\n");
}

#[test]
fn assignment_to_undeclared_name_is_a_reference_error() {
    let err = run_err("x = 1");
    assert_eq!(err.kind, ErrorKind::ReferenceError);
}

#[test]
fn unknown_identifier_suggests_a_close_name() {
    let err = run_err("countre := 1 yap(counter)");
    assert_eq!(err.kind, ErrorKind::ReferenceError);
    assert_eq!(err.suggestion.as_deref(), Some("countre"));
}

#[test]
fn misspelled_builtin_gets_a_suggestion() {
    let err = run_err("yapp(1)");
    assert_eq!(err.suggestion.as_deref(), Some("yap"));
}

#[test]
fn closures_capture_independent_state() {
    let out = run(concat!(
        "make_counter := \\{\n",
        "    n := 0\n",
        "    \\{ n = n + 1 n }\n",
        "}\n",
        "a := make_counter()\n",
        "b := make_counter()\n",
        "a() a()\n",
        "yap(a(), b())\n",
    ));
    assert_eq!(out, "3 1\n");
}

#[test]
fn recursion_through_the_defining_scope() {
    let out = run("fact := \\n { yif n <= 1 { yeet 1 } n * fact(n - 1) } yap(fact(10))");
    assert_eq!(out, "3628800\n");
}

#[test]
fn yeet_returns_early_from_a_function() {
    let out = run(concat!(
        "classify := \\n {\n",
        "    yif n < 0 { yeet \"neg\" }\n",
        "    \"pos\"\n",
        "}\n",
        "yap(classify(-1), classify(1))\n",
    ));
    assert_eq!(out, "neg pos\n");
}

#[test]
fn yeet_escapes_loops_up_to_the_function_boundary() {
    let out = run(concat!(
        "find := \\arr, target {\n",
        "    yall i: 0..len(arr) - 1 {\n",
        "        yif arr[i] == target { yeet i }\n",
        "    }\n",
        "    -1\n",
        "}\n",
        "yap(find([4, 5, 6], 5), find([4], 9))\n",
    ));
    assert_eq!(out, "1 -1\n");
}

#[test]
fn top_level_yeet_stops_the_program() {
    assert_eq!(run("yap(1) yeet 5 yap(2)"), "1\n");
}

#[test]
fn conditionals_are_expressions() {
    assert_eq!(run("x := yif false { 1 } yels { 2 } yap(x)"), "2\n");
    assert_eq!(run("y := yif false { 1 } yap(y)"), "null\n");
}

#[test]
fn yels_yif_chains() {
    let out = run(concat!(
        "grade := \\n {\n",
        "    yif n >= 90 { \"A\" } yels yif n >= 80 { \"B\" } yels { \"C\" }\n",
        "}\n",
        "yap(grade(95), grade(85), grade(10))\n",
    ));
    assert_eq!(out, "A B C\n");
}

#[test]
fn zero_is_truthy_but_empty_collections_are_not() {
    let out = run(concat!(
        "yif 0 { yap(\"zero\") }\n",
        "yif \"\" { yap(\"no\") } yels { yap(\"empty str\") }\n",
        "yif [] { yap(\"no\") } yels { yap(\"empty arr\") }\n",
        "yif %{} { yap(\"no\") } yels { yap(\"empty map\") }\n",
    ));
    assert_eq!(out, "zero\nempty str\nempty arr\nempty map\n");
}

#[test]
fn logical_operators_yield_the_deciding_operand() {
    assert_eq!(run("yap(null || \"fallback\", 1 && 2, false && 5)"), "fallback 2 false\n");
}

#[test]
fn arrays_are_shared_handles() {
    assert_eq!(run("a := [1, 2] b := a b << 3 yap(a)"), "[1, 2, 3]\n");
}

#[test]
fn append_chains_on_the_same_array() {
    assert_eq!(run("yap([] << 1 << 2)"), "[1, 2]\n");
}

#[test]
fn negative_index_counts_from_the_end() {
    assert_eq!(run("a := [1, 2, 3] yap(a[-1], \"hello\"[-1])"), "3 o\n");
}

#[test]
fn out_of_bounds_index_is_an_index_error() {
    assert_eq!(run_err("[1][5]").kind, ErrorKind::IndexError);
    assert_eq!(run_err("[1][-2]").kind, ErrorKind::IndexError);
}

#[test]
fn full_slice_is_a_fresh_copy() {
    let out = run("a := [1, 2, 3] b := a[0..-1] b[0] = 9 yap(a, b)");
    assert_eq!(out, "[1, 2, 3] [9, 2, 3]\n");
}

#[test]
fn nonnegative_slice_end_is_exclusive() {
    assert_eq!(run("a := [1, 2, 3, 4] yap(a[0..2], a[2..len(a)])"), "[1, 2] [3, 4]\n");
}

#[test]
fn slices_clamp_instead_of_faulting() {
    assert_eq!(run("yap([1, 2][0..99], [1, 2][5..9])"), "[1, 2] []\n");
}

#[test]
fn string_index_and_slice() {
    assert_eq!(run("s := \"hello\" yap(s[1], s[1..3])"), "e el\n");
}

#[test]
fn map_keys_are_stringified_expressions() {
    let out = run("m := %{1 + 1: \"two\"} m[\"x\"] = 5 yap(m[2], m[\"x\"], m[\"missing\"], len(m))");
    assert_eq!(out, "two 5 null 2\n");
}

#[test]
fn nested_index_assignment() {
    assert_eq!(run("grid := [[0, 0], [0, 0]] grid[1][0] = 5 yap(grid)"), "[[0, 0], [5, 0]]\n");
}

#[test]
fn compound_assignment() {
    assert_eq!(run("x := 10 x += 5 x *= 2 yap(x)"), "30\n");
}

#[test]
fn compound_assignment_to_undeclared_name_is_a_reference_error() {
    assert_eq!(run_err("q += 1").kind, ErrorKind::ReferenceError);
}

#[test]
fn compound_index_assignment_evaluates_the_subscript_once() {
    let out = run(concat!(
        "calls := [0]\n",
        "bump := \\{\n",
        "    calls[0] += 1\n",
        "    0\n",
        "}\n",
        "a := [10]\n",
        "a[bump()] += 5\n",
        "yap(a, calls)\n",
    ));
    assert_eq!(out, "[15] [1]\n");
}

#[test]
fn yoyo_runs_until_the_condition_fails() {
    assert_eq!(run("i := 0 yoyo i < 3 { i += 1 } yap(i)"), "3\n");
}

#[test]
fn unconditioned_yoyo_hits_the_resource_ceiling() {
    assert_eq!(run_err("yoyo { }").kind, ErrorKind::ResourceExceeded);
}

#[test]
fn runaway_recursion_hits_the_resource_ceiling() {
    assert_eq!(run_err("f := \\{ f() } f()").kind, ErrorKind::ResourceExceeded);
}

#[test]
fn runaway_mutual_recursion_hits_the_resource_ceiling() {
    let err = run_err("ping := \\{ pong() } pong := \\{ ping() } ping()");
    assert_eq!(err.kind, ErrorKind::ResourceExceeded);
}

#[test]
fn moderately_deep_recursion_still_works() {
    let out = run("down := \\n { yif n == 0 { yeet \"done\" } down(n - 1) } yap(down(100))");
    assert_eq!(out, "done\n");
}

#[test]
fn structural_equality() {
    let out = run("yap([1, [2]] == [1, [2]], %{\"a\": 1} == %{\"a\": 1}, 1 == \"1\")");
    assert_eq!(out, "true true false\n");
}

#[test]
fn functions_compare_by_identity() {
    assert_eq!(run("f := \\{ 1 } g := f yap(f == g, f == \\{ 1 })"), "true false\n");
}

#[test]
fn wrong_argument_count_is_an_arity_error() {
    assert_eq!(run_err("(\\a { a })()").kind, ErrorKind::ArityError);
}

#[test]
fn calling_a_number_is_a_type_error() {
    assert_eq!(run_err("5(1)").kind, ErrorKind::TypeError);
}

#[test]
fn division_by_zero_faults_in_both_modes() {
    assert_eq!(run_err("1 / 0").kind, ErrorKind::DivideByZero);
    assert_eq!(run_err("yolo { 1 % 0 }").kind, ErrorKind::DivideByZero);
}

#[test]
fn yikes_aborts_with_the_rendered_message() {
    let mut out = String::new();
    let err = execute("yap(\"before\") yikes(\"boom\", 42) yap(\"after\")", |t| {
        out.push_str(t)
    })
    .expect_err("yikes should abort");
    assert_eq!(err.kind, ErrorKind::UserAbort);
    assert_eq!(err.message, "boom 42");
    assert_eq!(out, "before\n");
}

#[test]
fn strict_mode_rejects_mixed_operands() {
    assert_eq!(run_err("\"ab\" * 3").kind, ErrorKind::TypeError);
    assert_eq!(run_err("1 + \"a\"").kind, ErrorKind::TypeError);
}

#[test]
fn baking_is_rejected_outside_yolo() {
    let err = run_err("add := \\a, b { a + b } add + 2");
    assert_eq!(err.kind, ErrorKind::TypeError);
}

#[test]
fn yolo_mode_ends_with_its_block() {
    assert_eq!(run_err("yolo { } \"a\" * 2").kind, ErrorKind::TypeError);
}

#[test]
fn yolo_repeats_strings_and_arrays() {
    assert_eq!(run("yolo { yap(\"ab\" * 3, 3 * \"cd\", \"x\" * 0) }"), "ababab cdcdcd \n");
    assert_eq!(run("yolo { yap([1, 2] * 2) }"), "[1, 2, 1, 2]\n");
}

#[test]
fn yolo_reinterprets_numeric_strings_and_bools() {
    assert_eq!(run("yolo { yap(\"2\" * 5, \"10\" - 4, true + 1) }"), "10 6 2\n");
}

#[test]
fn yolo_addition_falls_back_to_concatenation() {
    assert_eq!(run("yolo { yap(1 + \"a\", [1] + \"!\") }"), "1a [1]!\n");
}

#[test]
fn yolo_negation_bends_to_the_operand() {
    assert_eq!(run("yolo { yap(-\"abc\", -true, -(1..3)) }"), "cba false 3..1\n");
}

#[test]
fn yolo_assignment_declares_unbound_names() {
    assert_eq!(run("yolo { ghost = 7 yap(ghost) }"), "7\n");
}

#[test]
fn yolo_bakes_scalars_into_functions() {
    let out = run("add := \\a, b { a + b } yolo { add2 := add + 2 yap(add2(3)) }");
    assert_eq!(out, "5\n");
}

#[test]
fn yolo_bakes_arrays_positionally() {
    let out = run("add := \\a, b { a + b } yolo { done := add + [1, 2] yap(done()) }");
    assert_eq!(out, "3\n");
}

#[test]
fn yolo_bakes_maps_by_parameter_name() {
    let out = run("sub := \\a, b { a - b } yolo { g := sub + %{\"b\": 1} yap(g(10)) }");
    assert_eq!(out, "9\n");
}

#[test]
fn baking_null_leaves_the_function_unchanged() {
    let out = run("add := \\a, b { a + b } yolo { same := add + null yap(same(1, 2)) }");
    assert_eq!(out, "3\n");
}

#[test]
fn len_counts_members() {
    assert_eq!(run("yap(len(\"héllo\"), len([1, 2]), len(1..10), len(5..1))"), "5 2 10 5\n");
}

#[test]
fn chr_ord_num_builtins() {
    assert_eq!(run("yap(chr(97), ord(\"a\"), num(\"3.5\"), num(true))"), "a 97 3.5 1\n");
}

#[test]
fn yoink_removes_elements() {
    assert_eq!(run("a := [1, 2, 3] yap(yoink(a), yoink(a, 0), a)"), "3 1 [2]\n");
}

#[test]
fn user_bindings_shadow_builtins() {
    assert_eq!(run("len := 42 yap(len)"), "42\n");
}

#[test]
fn yahtzee_draws_stay_in_the_range() {
    let out = run(concat!(
        "yall 50 {\n",
        "    d := yahtzee(1..6)\n",
        "    yif d < 1 { yikes(\"low\") }\n",
        "    yif d > 6 { yikes(\"high\") }\n",
        "}\n",
        "yap(\"ok\")\n",
    ));
    assert_eq!(out, "ok\n");
}

#[test]
fn fizzbuzz_end_to_end() {
    let out = run(concat!(
        "yall n: 1..15 {\n",
        "    line := \"\"\n",
        "    yif n % 3 == 0 { line = line + \"fizz\" }\n",
        "    yif n % 5 == 0 { line = line + \"buzz\" }\n",
        "    yif line { yap(line) } yels { yap(n) }\n",
        "}\n",
    ));
    let expected = "1\n2\nfizz\n4\nbuzz\nfizz\n7\n8\nfizz\nbuzz\n11\nfizz\n13\n14\nfizzbuzz\n";
    assert_eq!(out, expected);
}

#[test]
fn lex_errors_carry_a_location() {
    let err = run_err("x := 1 &\nyap(x)");
    assert_eq!(err.kind, ErrorKind::LexError);
    assert!(err.location.is_known());
    assert_eq!(err.source_line.as_deref(), Some("x := 1 &"));
}

#[test]
fn unterminated_string_is_a_lex_error() {
    assert_eq!(run_err("yap(\"oops").kind, ErrorKind::LexError);
}

#[test]
fn parse_errors_name_the_unexpected_token() {
    let err = run_err("x := ");
    assert_eq!(err.kind, ErrorKind::ParseError);
    assert!(err.message.contains("end of input"));

    assert_eq!(run_err("[1, 2").kind, ErrorKind::ParseError);
    assert_eq!(run_err("5 := 1").kind, ErrorKind::ParseError);
}
