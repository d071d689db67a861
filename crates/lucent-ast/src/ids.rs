//! Stable node identifiers.
//!
//! Declarations, expressions, and patterns all need stable node
//! identifiers; these newtypes are plain indices into the arenas owned by
//! [`crate::program::ScopedProgram`], cheap to copy and hash.

macro_rules! node_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn from_index(index: usize) -> Self {
                $name(index as u32)
            }
        }
    };
}

node_id!(DeclId);
node_id!(ExprId);
node_id!(PatternId);
node_id!(ScopeId);
node_id!(ModuleId);
node_id!(TranslationUnitId);
