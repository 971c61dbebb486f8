use crate::tensor::Tensor;

#[test]
fn test_shape_dimension_size() {
    let tensor = Tensor::zeros(&[2, 3, 4, 5]);
    assert_eq!(tensor.shape(), &[2, 3, 4, 5]);
    assert_eq!(tensor.dimension(), 4);
    assert_eq!(tensor.size(), 120);

    let scalar = Tensor::new(&[1.0], &[]);
    assert_eq!(scalar.dimension(), 0);
    assert_eq!(scalar.size(), 1);
}

#[test]
fn test_is_same_shape() {
    let a = Tensor::zeros(&[1, 4]);
    let b = Tensor::zeros(&[1, 4]);
    let c = Tensor::zeros(&[4]);
    assert!(a.is_same_shape(&b));
    assert!(!a.is_same_shape(&c));
}

#[test]
fn test_min_max_value() {
    let tensor = Tensor::new(&[3.0, -1.5, 7.25, 0.0], &[2, 2]);
    assert_eq!(tensor.min_value(), -1.5);
    assert_eq!(tensor.max_value(), 7.25);
}

#[test]
fn test_new_with_wrong_len() {
    crate::assert_panic!(Tensor::new(&[1.0, 2.0, 3.0], &[2, 2]));
}
