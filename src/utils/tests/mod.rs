mod image_trait;
