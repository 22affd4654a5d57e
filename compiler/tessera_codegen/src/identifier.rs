//! Emitted expressions and the references they hold.
//!
//! Every expression emitter returns an [`Identifier`]: the C++ expression
//! text plus how the value's reference is held. Statement emitters decide,
//! through the accessors, whether an argument is passed borrowed or with a
//! new reference, so reference counts balance without a later pass.

use crate::CodeGenerationError;

/// How the reference produced by an emitted expression is held.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// A new reference that must be released or handed on exactly once.
    OwnedTemporary,
    /// A reference owned elsewhere (a local variable, a module dict entry).
    Borrowed,
    /// A constant-pool symbol or runtime singleton, alive for the whole run.
    Constant,
}

/// C++ expression text with ownership information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    code: String,
    ownership: Ownership,
    /// Owned temporaries this identifier was built from, in evaluation order.
    owned_parts: Vec<Identifier>,
}

impl Identifier {
    pub fn new(code: impl Into<String>, ownership: Ownership) -> Self {
        Identifier {
            code: code.into(),
            ownership,
            owned_parts: Vec::new(),
        }
    }

    pub fn owned(code: impl Into<String>) -> Self {
        Self::new(code, Ownership::OwnedTemporary)
    }

    pub fn borrowed(code: impl Into<String>) -> Self {
        Self::new(code, Ownership::Borrowed)
    }

    pub fn constant(code: impl Into<String>) -> Self {
        Self::new(code, Ownership::Constant)
    }

    /// Record the owned temporaries among `operands` as parts of `self`.
    #[must_use]
    pub fn with_parts_from(mut self, operands: &[Identifier]) -> Self {
        self.owned_parts = operands
            .iter()
            .filter(|operand| operand.is_owned())
            .cloned()
            .collect();
        self
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[inline]
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.ownership == Ownership::OwnedTemporary
    }

    pub fn owned_parts(&self) -> &[Identifier] {
        &self.owned_parts
    }

    /// Code usable where a borrowed reference is expected. Owned temporaries
    /// are held by a scoped releaser for the duration of the full expression.
    pub fn temporary_ref(&self) -> String {
        match self.ownership {
            Ownership::OwnedTemporary => format!("PyObjectTemporary( {} ).asObject()", self.code),
            Ownership::Borrowed | Ownership::Constant => self.code.clone(),
        }
    }

    /// Code yielding a new reference the receiver takes over.
    pub fn export_ref(&self) -> String {
        match self.ownership {
            Ownership::OwnedTemporary => self.code.clone(),
            Ownership::Borrowed | Ownership::Constant => {
                format!("INCREASE_REFCOUNT( {} )", self.code)
            }
        }
    }

    /// Code evaluating the expression and discarding its value.
    pub fn drop_ref(&self) -> String {
        match self.ownership {
            Ownership::OwnedTemporary => format!("DECREASE_REFCOUNT( {} )", self.code),
            Ownership::Borrowed | Ownership::Constant => format!("(void)( {} )", self.code),
        }
    }

    /// Statement releasing an owned temporary.
    pub fn release(&self) -> Result<String, CodeGenerationError> {
        match self.ownership {
            Ownership::OwnedTemporary => Ok(format!("Py_DECREF( {} );", self.code)),
            Ownership::Borrowed | Ownership::Constant => {
                Err(CodeGenerationError::ReleaseOfUnowned {
                    code: self.code.clone(),
                })
            }
        }
    }
}

/// Wrap argument code so the target language evaluates it left to right.
pub(crate) fn eval_ordered(args: &[String]) -> String {
    match args {
        [] => String::new(),
        [single] => single.clone(),
        _ => format!("EVAL_ORDERED_{}( {} )", args.len(), args.join(", ")),
    }
}

/// `function( args… )` with ordered evaluation of the arguments.
pub(crate) fn call_code(function: &str, args: &[String]) -> String {
    if args.is_empty() {
        format!("{function}()")
    } else {
        format!("{function}( {} )", eval_ordered(args))
    }
}

/// Call a runtime helper that returns a new reference and borrows its
/// operands.
pub(crate) fn helper_call(function: &str, operands: &[Identifier]) -> Identifier {
    let args: Vec<String> = operands.iter().map(Identifier::temporary_ref).collect();
    Identifier::owned(call_code(function, &args)).with_parts_from(operands)
}

/// How a runtime constructor treats the element references passed to it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConstructorContract {
    pub function: &'static str,
    /// Whether the constructor takes over the element references.
    pub steals_references: bool,
    /// The elements are first packed into a tuple, which is the
    /// constructor's only argument.
    pub from_tuple: bool,
}

impl ConstructorContract {
    pub const TUPLE: ConstructorContract = ConstructorContract {
        function: "MAKE_TUPLE",
        steals_references: false,
        from_tuple: false,
    };
    pub const LIST: ConstructorContract = ConstructorContract {
        function: "MAKE_LIST",
        steals_references: true,
        from_tuple: false,
    };
    pub const SET: ConstructorContract = ConstructorContract {
        function: "MAKE_SET",
        steals_references: false,
        from_tuple: true,
    };
    /// Keys and values are passed interleaved.
    pub const DICT: ConstructorContract = ConstructorContract {
        function: "MAKE_DICT",
        steals_references: false,
        from_tuple: false,
    };

    /// Build the container from already emitted elements.
    pub fn construct(self, elements: &[Identifier]) -> Identifier {
        if self.from_tuple {
            let tuple = ConstructorContract::TUPLE.construct(elements);
            return Identifier::owned(call_code(self.function, &[tuple.temporary_ref()]))
                .with_parts_from(elements);
        }
        let args: Vec<String> = elements
            .iter()
            .map(|element| {
                if self.steals_references {
                    element.export_ref()
                } else {
                    element.temporary_ref()
                }
            })
            .collect();
        Identifier::owned(call_code(self.function, &args)).with_parts_from(elements)
    }
}
