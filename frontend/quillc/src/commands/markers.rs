//! The `markers` command: show the active classification vocabulary.

use quill_classify::MarkerTable;

/// Print the marker rules in precedence order.
pub fn list_markers() {
    println!("Diagnostic markers (first match wins):");
    println!();
    print!("{}", MarkerTable::default());
    println!();
    println!("Unmatched stdout lines are retained as unclassified.");
    println!("All stderr lines are filed as semantic errors.");
}
