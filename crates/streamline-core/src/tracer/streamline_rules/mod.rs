/*!
# Streamline Marker Rules

The rules that together implement the marker transform:

- `ProgramInitializer`: prepends the runtime declaration
- `SignatureRewriter`: completes `_`-parameter functions through their marker
- `CallRewriter`: adapts array receivers, then turns marker calls into
  future/await calls
- `ConstructorRewriter`: rejects markers in `new` expressions
*/

pub mod call;
pub mod constructor;
pub mod program_init;
pub mod signature;


// Re-export commonly used rules
pub use call::CallRewriter;
pub use constructor::ConstructorRewriter;
pub use program_init::ProgramInitializer;
pub use signature::SignatureRewriter;

use super::rules::TransformationRule;

/// Every marker rule with its default priority.
pub fn all() -> Vec<Box<dyn TransformationRule>> {
    vec![
        Box::new(ProgramInitializer::new()),
        Box::new(SignatureRewriter::new()),
        Box::new(CallRewriter::new()),
        Box::new(ConstructorRewriter::new()),
    ]
}
