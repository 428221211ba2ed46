use super::{ExecutionContext, VmError};
use crate::integer_ops::{self, bool_word};

binary_op!(lt, |a, b| bool_word(a < b));
binary_op!(gt, |a, b| bool_word(a > b));
binary_op!(slt, |a, b| bool_word(integer_ops::signed_lt(a, b)));
binary_op!(sgt, |a, b| bool_word(integer_ops::signed_lt(b, a)));
binary_op!(eq, |a, b| bool_word(a == b));
unary_op!(iszero, |a| bool_word(a.is_zero()));
binary_op!(and, |a, b| a & b);
binary_op!(or, |a, b| a | b);
binary_op!(xor, |a, b| a ^ b);
unary_op!(not, |a| !a);
binary_op!(byte, |index, value| integer_ops::byte(index, value));
binary_op!(shl, |shift, value| integer_ops::shl(shift, value));
binary_op!(shr, |shift, value| integer_ops::shr(shift, value));
binary_op!(sar, |shift, value| integer_ops::sar(shift, value));
