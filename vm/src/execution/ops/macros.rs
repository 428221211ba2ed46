/// Defines a handler popping one operand and pushing `$body`.
macro_rules! unary_op {
    ($name:ident, |$a:ident| $body:expr) => {
        pub(crate) fn $name(ctx: &mut ExecutionContext) -> Result<(), VmError> {
            let $a = ctx.pop()?;
            ctx.push($body)
        }
    };
}

/// Defines a handler popping two operands, top first, and pushing `$body`.
macro_rules! binary_op {
    ($name:ident, |$a:ident, $b:ident| $body:expr) => {
        pub(crate) fn $name(ctx: &mut ExecutionContext) -> Result<(), VmError> {
            let $a = ctx.pop()?;
            let $b = ctx.pop()?;
            ctx.push($body)
        }
    };
}

macro_rules! ternary_op {
    ($name:ident, |$a:ident, $b:ident, $c:ident| $body:expr) => {
        pub(crate) fn $name(ctx: &mut ExecutionContext) -> Result<(), VmError> {
            let $a = ctx.pop()?;
            let $b = ctx.pop()?;
            let $c = ctx.pop()?;
            ctx.push($body)
        }
    };
}

/// Defines a handler pushing a value read from the context.
macro_rules! push_op {
    ($name:ident, |$ctx:ident| $body:expr) => {
        pub(crate) fn $name($ctx: &mut ExecutionContext) -> Result<(), VmError> {
            let value = $body;
            $ctx.push(value)
        }
    };
}
