use approx::assert_abs_diff_eq;

use crate::assert_panic;
use crate::errors::TensorError;
use crate::tensor::Tensor;

#[test]
fn test_scalar_ops() {
    let tensor = Tensor::new(&[0.0, 51.0, 255.0], &[3]);

    let added = &tensor + 1.0;
    assert_eq!(added.as_slice(), &[1.0, 52.0, 256.0]);

    let subbed = &tensor - 1.0;
    assert_eq!(subbed.as_slice(), &[-1.0, 50.0, 254.0]);

    let multiplied = &tensor * 2.0;
    assert_eq!(multiplied.as_slice(), &[0.0, 102.0, 510.0]);

    let divided = tensor / 255.0;
    assert_abs_diff_eq!(divided[[1]], 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(divided[[2]], 1.0, epsilon = 1e-6);
}

#[test]
fn test_div_by_zero() {
    let tensor = Tensor::new(&[1.0, 2.0], &[2]);
    assert_panic!(&tensor / 0.0, TensorError::DivByZero);
}
