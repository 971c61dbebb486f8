mod resize;
