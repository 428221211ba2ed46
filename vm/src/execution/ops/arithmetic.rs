use super::{ExecutionContext, VmError};
use crate::integer_ops::{self, Word};

binary_op!(add, |a, b| a.overflowing_add(b).0);
binary_op!(mul, |a, b| a.overflowing_mul(b).0);
binary_op!(sub, |a, b| a.overflowing_sub(b).0);
binary_op!(div, |a, b| if b.is_zero() { Word::zero() } else { a / b });
binary_op!(sdiv, |a, b| integer_ops::sdiv(a, b));
binary_op!(modulo, |a, b| if b.is_zero() { Word::zero() } else { a % b });
binary_op!(smod, |a, b| integer_ops::smod(a, b));
ternary_op!(addmod, |a, b, n| integer_ops::addmod(a, b, n));
ternary_op!(mulmod, |a, b, n| integer_ops::mulmod(a, b, n));
binary_op!(exp, |base, exponent| integer_ops::exp(base, exponent));
binary_op!(signextend, |k, value| integer_ops::signextend(k, value));
